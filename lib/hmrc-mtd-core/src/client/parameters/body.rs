use headers::ContentType;
use serde::Serialize;

use crate::client::MtdError;

/// The body of a request with its content type.
#[derive(Clone, derive_more::Debug)]
pub struct CallBody {
    pub(in crate::client) content_type: ContentType,
    #[debug(ignore)]
    pub(in crate::client) data: Vec<u8>,
}

impl CallBody {
    /// Creates an `application/json` body.
    pub fn json<T>(t: &T) -> Result<Self, MtdError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(t)?;
        Ok(Self {
            content_type: ContentType::json(),
            data,
        })
    }

    /// Creates an `application/x-www-form-urlencoded` body.
    pub fn form<T>(t: &T) -> Result<Self, MtdError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_urlencoded::to_string(t)?.into_bytes();
        Ok(Self {
            content_type: ContentType::form_url_encoded(),
            data,
        })
    }

    /// Returns the content type.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Returns the serialised bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
