/*!
Request payloads.

Payloads are deserialized with serde, which rejects unknown and
mistyped fields, then checked with `validator` rules. Either step
failing is an `Error::Invariant` describing the first violation.
*/
use chrono::Datelike;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{Error, Result};

pub const MAX_COVER_BYTES: usize = 512_000;
pub const MAX_JSON_BYTES: usize = 64 * 1024;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/apng", "apng"),
    ("image/avif", "avif"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
#[validate(schema(function = "album_year"))]
pub struct AlbumPayload {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(range(min = 1900, message = "must be greater than or equal to 1900"))]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
#[validate(schema(function = "song_year"))]
pub struct SongPayload {
    #[validate(custom = "not_blank")]
    pub title: String,
    #[validate(range(min = 1900, message = "must be greater than or equal to 1900"))]
    pub year: i32,
    #[validate(custom = "not_blank")]
    pub performer: String,
    #[validate(custom = "not_blank")]
    pub genre: Option<String>,
    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pub duration: Option<i32>,
    #[validate(custom = "not_blank")]
    pub album_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PlaylistPayload {
    #[validate(custom = "not_blank")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PlaylistSongPayload {
    #[validate(custom = "not_blank")]
    pub song_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CollaborationPayload {
    #[validate(custom = "not_blank")]
    pub playlist_id: String,
    #[validate(custom = "not_blank")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(
        custom = "not_blank",
        length(max = 50, message = "length must be less than or equal to 50 characters long")
    )]
    pub username: String,
    #[validate(custom = "not_blank")]
    pub password: String,
    #[validate(custom = "not_blank")]
    pub fullname: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CredentialPayload {
    #[validate(custom = "not_blank")]
    pub username: String,
    #[validate(custom = "not_blank")]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RefreshTokenPayload {
    #[validate(custom = "not_blank")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ExportPayload {
    #[validate(email(message = "must be a valid email"))]
    pub target_email: String,
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("is not allowed to be empty".into());
        return Err(err);
    }
    Ok(())
}

fn not_after_this_year(year: i32) -> std::result::Result<(), ValidationError> {
    let max = chrono::Utc::now().year();
    if year > max {
        let mut err = ValidationError::new("year");
        err.message = Some(format!("\"year\" must be less than or equal to {}", max).into());
        return Err(err);
    }
    Ok(())
}

fn album_year(payload: &AlbumPayload) -> std::result::Result<(), ValidationError> {
    not_after_this_year(payload.year)
}

fn song_year(payload: &SongPayload) -> std::result::Result<(), ValidationError> {
    not_after_this_year(payload.year)
}

/// `album_id` -> `albumId`, matching the json field names
fn json_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Describe the first violation, ordered by field name so the
/// message is stable.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(name, _)| *name);
    fields
        .into_iter()
        .find_map(|(name, errs)| {
            let err = errs.first()?;
            let detail = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("failed {} check", err.code));
            if name == "__all__" {
                Some(detail)
            } else {
                Some(format!("\"{}\" {}", json_name(name), detail))
            }
        })
        .unwrap_or_else(|| "invalid payload".to_string())
}

/// Deserialize and validate a json request body
pub fn parse<T: DeserializeOwned + Validate>(body: &[u8]) -> Result<T> {
    let payload: T =
        serde_json::from_slice(body).map_err(|e| Error::invariant(format!("invalid payload: {}", e)))?;
    payload
        .validate()
        .map_err(|e| Error::invariant(describe(&e)))?;
    Ok(payload)
}

/// Validate an uploaded cover's headers, returning the file extension
/// to store it under.
pub fn validate_image_headers(content_type: Option<&str>, len: usize) -> Result<&'static str> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_lowercase())
        .ok_or_else(|| Error::invariant("\"content-type\" is required"))?;
    let ext = IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            Error::invariant(format!(
                "\"content-type\" must be one of [{}]",
                IMAGE_TYPES
                    .iter()
                    .map(|(mime, _)| *mime)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
    if len == 0 {
        return Err(Error::invariant("cover image is empty"));
    }
    if len > MAX_COVER_BYTES {
        return Err(too_large(MAX_COVER_BYTES));
    }
    Ok(ext)
}

pub fn too_large(limit: usize) -> Error {
    Error::PayloadTooLarge(format!("payload must be at most {} bytes", limit))
}
