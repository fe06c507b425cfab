use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }
    };
}

string_newtype!(ReelId);
string_newtype!(StockIdentifier);

impl StockIdentifier {
    /// Builds the composite `<exchangeSegment>@<token>` key used to tag reels.
    pub fn from_parts(segment_id: i64, token: impl fmt::Display) -> Self {
        Self(format!("{segment_id}@{token}"))
    }

    pub fn segment(&self) -> Option<&str> {
        self.0.split_once('@').map(|(segment, _)| segment)
    }

    pub fn token(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, token)| token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOption {
    pub label: String,
    pub value: StockIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reel {
    pub id: ReelId,
    pub caption: String,
    pub media_url: String,
    pub stock_identifier: StockIdentifier,
    pub like_count: i64,
}

/// A video picked by the user, held in memory until it is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl VideoFile {
    pub fn new(file_name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for VideoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}
