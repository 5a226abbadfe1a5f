use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct ContactRow {
    #[serde(rename = "Reference")]
    pub(crate) reference: String,
    #[serde(rename = "Email", default, deserialize_with = "empty_string_as_none")]
    pub(crate) email: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    pub(crate) phone: Option<String>,
    #[serde(
        rename = "Driving Licence",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) driving_licence: Option<String>,
    #[serde(rename = "NI Number", default, deserialize_with = "empty_string_as_none")]
    pub(crate) ni_number: Option<String>,
    #[serde(rename = "Postcode", default, deserialize_with = "empty_string_as_none")]
    pub(crate) postcode: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ContactRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<ContactRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
