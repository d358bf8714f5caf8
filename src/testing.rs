use crate::errors::Result;
use crate::forms::Form;
use crate::types::PayloadValue;
use std::path::PathBuf;

/// Markup fixtures and small helpers shared by the unit tests.
pub struct TestHelper;

impl TestHelper {
    pub const TWO_FORM_PAGE: &'static str = r#"
        <html>
            <body>
                <form id="search" action="/search">
                    <input name="q" value="queen" />
                    <input type="submit" name="go" value="Search" />
                </form>
                <form id="login" action="/login" method="post">
                    <input name="username" />
                    <input name="password" type="password" />
                </form>
            </body>
        </html>
    "#;

    pub const SELECT_JOHN: &'static str = r#"
        <select name="john">
            <option value="tie">your mother down</option>
            <option value="you're" selected>my best friend</option>
            <option value="the">millionaire waltz</option>
        </select>
    "#;

    pub const RADIO_MEMBERS: &'static str = r#"
        <input type="radio" name="members" value="mercury" checked />vocals<br />
        <input type="radio" name="members" value="may" />guitar<br />
        <input type="radio" name="members" value="taylor" />drums<br />
        <input type="radio" name="members" value="deacon" checked />bass<br />
    "#;

    pub const CHECKBOX_MEMBERS: &'static str = r#"
        <input type="checkbox" name="member" value="mercury" checked />vocals<br />
        <input type="checkbox" name="member" value="may" />guitar<br />
        <input type="checkbox" name="member" value="taylor" />drums<br />
        <input type="checkbox" name="member" value="deacon" checked />bass<br />
    "#;

    pub const RADIO_TWO_GROUPS: &'static str = r#"
        <input type="radio" name="favorite_member" />freddie<br />
        <input type="radio" name="favorite_member" />brian<br />
        <input type="radio" name="favorite_member" />roger<br />
        <input type="radio" name="favorite_member" />john<br />
        <input type="radio" name="favorite_song" />rhapsody<br />
        <input type="radio" name="favorite_song" />killer<br />
    "#;

    pub const QUEEN_FORM: &'static str = r#"
        <form>
            <input name="vocals" />
            <input name="guitar" type="file" />
            <select name="drums">
                <option value="roger">Roger<br />
                <option value="john">John<br />
            </select>
            <input type="radio" name="bass" value="Roger">Roger<br />
            <input type="radio" name="bass" value="John">John<br />
            <input name="multi" value="multi1" />
            <input name="multi" value="multi2" />
            <input type="submit" name="submit" value="submit" />
        </form>
    "#;

    pub const MULTI_SUBMIT_FORM: &'static str = r#"
        <form action="/vote" method="post">
            <input name="note" value="encore" />
            <input type="submit" name="submit1" value="value1" />
            <input type="submit" name="submit2" value="value2" />
        </form>
    "#;

    pub fn parse_form(html: &str) -> Result<Form> {
        Form::parse(html)
    }

    /// Text pairs as borrowed tuples; file values are left out.
    pub fn text_pairs(pairs: &[(String, PayloadValue)]) -> Vec<(&str, &str)> {
        pairs
            .iter()
            .filter_map(|(name, value)| value.as_text().map(|text| (name.as_str(), text)))
            .collect()
    }

    /// Write `contents` to a file under the system temp directory.
    pub fn write_temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("browser-forms-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write temp file");
        path
    }
}
