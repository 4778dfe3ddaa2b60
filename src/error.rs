use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScError {
    #[error("cannot reach or authenticate to SecurityCenter: {0}")]
    Connectivity(String),

    #[error("query rejected by SecurityCenter: {0}")]
    MalformedQuery(String),

    #[error("missing or mistyped field in {object} record: {source}")]
    MissingField {
        object: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {field}")]
    InvalidField { field: &'static str, value: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ScError {
    fn from(err: reqwest::Error) -> Self {
        ScError::Connectivity(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScError>;
