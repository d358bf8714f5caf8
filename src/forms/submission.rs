use crate::core::config::ExportConfig;
use crate::errors::Result;
use crate::forms::payload::RequestArgs;
use crate::forms::{Form, Submit};
use crate::types::PayloadValue;
use serde::{Serialize, Serializer};
use tracing::debug;
use url::Url;

/// Everything a transport needs to send a form.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub method: String,
    #[serde(serialize_with = "serialize_url")]
    pub url: Url,
    pub args: RequestArgs,
    #[serde(skip)]
    query_key: String,
}

fn serialize_url<S: Serializer>(url: &Url, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

impl Submission {
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// The request URL, with the query channel appended for GET.
    pub fn target_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.is_get() {
            return url;
        }
        let pairs = match self.args.get(&self.query_key) {
            Some(pairs) if !pairs.is_empty() => pairs,
            _ => return url,
        };
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in pairs {
                if let PayloadValue::Text(text) = value {
                    query.append_pair(name, text);
                }
            }
        }
        url
    }
}

impl Form {
    /// Assemble a submission against `base`, the URL of the page holding the form.
    pub fn submission(&self, base: &Url, submit: Option<&Submit>) -> Result<Submission> {
        self.submission_with(base, submit, &ExportConfig::default())
    }

    pub fn submission_with(
        &self,
        base: &Url,
        submit: Option<&Submit>,
        config: &ExportConfig,
    ) -> Result<Submission> {
        let url = base.join(self.action())?;
        let method = self.method().to_uppercase();
        let args = self.serialize(submit)?.to_requests_with(&method, config);

        debug!(method = %method, url = %url, "assembled submission");

        Ok(Submission {
            method,
            url,
            args,
            query_key: config.query_key.clone(),
        })
    }
}
