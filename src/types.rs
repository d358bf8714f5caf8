use crate::errors::{FormError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Ordered `(name, value)` pairs; duplicate names are kept.
pub type Pairs = Vec<(String, PayloadValue)>;

/// Shared readable stream attached to a file input.
///
/// Clones share the same underlying reader, so serializing a form twice hands
/// the transport the same stream both times. Equality is handle identity.
#[derive(Clone)]
pub struct FileHandle {
    filename: Option<String>,
    reader: Arc<Mutex<Box<dyn Read + Send>>>,
}

impl FileHandle {
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            filename: None,
            reader: Arc::new(Mutex::new(Box::new(reader))),
        }
    }

    /// Open a filesystem path for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(Self {
            filename,
            reader: Arc::new(Mutex::new(Box::new(file))),
        })
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Drain the remaining bytes of the stream.
    pub fn read_to_end(&self) -> Result<Vec<u8>> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| FormError::BadFileValue("file handle lock poisoned".to_string()))?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn same_handle(&self, other: &FileHandle) -> bool {
        Arc::ptr_eq(&self.reader, &other.reader)
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

impl From<File> for FileHandle {
    fn from(file: File) -> Self {
        FileHandle::from_reader(file)
    }
}

/// The value a field reports or is assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    File(FileHandle),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            FieldValue::File(handle) => Some(handle),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::List(_) => "list",
            FieldValue::File(_) => "file",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
            FieldValue::File(handle) => write!(f, "<file {}>", handle.filename().unwrap_or("?")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FieldValue {
    fn from(values: &[&str]) -> Self {
        FieldValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<FileHandle> for FieldValue {
    fn from(handle: FileHandle) -> Self {
        FieldValue::File(handle)
    }
}

impl From<File> for FieldValue {
    fn from(file: File) -> Self {
        FieldValue::File(FileHandle::from(file))
    }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

impl PartialEq<Vec<&str>> for FieldValue {
    fn eq(&self, other: &Vec<&str>) -> bool {
        match self {
            FieldValue::List(items) => items.iter().map(String::as_str).eq(other.iter().copied()),
            _ => false,
        }
    }
}

/// One serialized value headed for the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Text(String),
    File(FileHandle),
}

impl PayloadValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PayloadValue::Text(text) => Some(text),
            PayloadValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            PayloadValue::File(handle) => Some(handle),
            PayloadValue::Text(_) => None,
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Text(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Text(value)
    }
}

impl PartialEq<&str> for PayloadValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

impl Serialize for PayloadValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PayloadValue::Text(text) => serializer.serialize_str(text),
            PayloadValue::File(handle) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("file", &handle.filename())?;
                map.end()
            }
        }
    }
}
