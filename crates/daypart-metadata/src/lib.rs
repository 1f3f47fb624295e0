//! Descriptor codec for Daypart tokens.
//!
//! A descriptor is a self-contained `data:application/json;base64,` URI
//! wrapping the token's metadata JSON, which in turn embeds the artwork as a
//! `data:image/svg+xml;base64,` URI. Pure synchronous; no I/O.
//!
//! # Quick start
//!
//! ```no_run
//! use daypart_core::{TimePoint, TimezoneOffset, TokenId, classify};
//!
//! let breakdown = classify(TimePoint(1_717_200_000), TimezoneOffset::UTC);
//! let uri = daypart_metadata::render(TokenId::FIRST, &breakdown).unwrap();
//! let meta = daypart_metadata::decode(&uri).unwrap();
//! println!("{} is {:?}", meta.name, meta.state());
//! ```

mod descriptor;
pub mod error;
pub mod image;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use daypart_core::{LocalTimeBreakdown, TokenId};

pub use descriptor::{Attribute, MetadataDescriptor, traits};
pub use error::{Error, Result};

/// Scheme prefix of every descriptor.
pub const DESCRIPTOR_PREFIX: &str = "data:application/json;base64,";

// ─── Public API ──────────────────────────────────────────────────────────────

/// Encode the descriptor for `token_id` at `breakdown`, embedding `image`
/// (normally an [`image::data_uri`]) byte-for-byte.
pub fn encode(
  token_id: TokenId,
  breakdown: &LocalTimeBreakdown,
  image: &str,
) -> Result<String> {
  encode_descriptor(&MetadataDescriptor::new(token_id, breakdown, image))
}

/// Encode an already-built descriptor.
pub fn encode_descriptor(descriptor: &MetadataDescriptor) -> Result<String> {
  let json = serde_json::to_vec(descriptor).map_err(Error::Encode)?;
  Ok(format!("{DESCRIPTOR_PREFIX}{}", B64.encode(json)))
}

/// Render the artwork for `breakdown.state` and encode the full descriptor.
///
/// This is the exact path the ledger uses for `descriptor_of`.
pub fn render(token_id: TokenId, breakdown: &LocalTimeBreakdown) -> Result<String> {
  let image = image::data_uri(&image::render_svg(token_id, breakdown));
  encode(token_id, breakdown, &image)
}

/// Decode a descriptor string.
///
/// Fails with [`Error::BadPrefix`], [`Error::BadBase64`] or
/// [`Error::MalformedJson`] depending on which stage rejected the input.
pub fn decode(descriptor: &str) -> Result<MetadataDescriptor> {
  let payload = descriptor
    .strip_prefix(DESCRIPTOR_PREFIX)
    .ok_or(Error::BadPrefix { expected: DESCRIPTOR_PREFIX })?;
  let json = B64.decode(payload).map_err(Error::BadBase64)?;
  serde_json::from_slice(&json).map_err(Error::MalformedJson)
}

#[cfg(test)]
mod tests {
  use daypart_core::{TimePoint, TimeState, TimezoneOffset, classify};

  use super::*;

  /// 2024-06-01T00:00:00Z
  const MIDNIGHT: u64 = 1_717_200_000;

  fn breakdown(secs_after_midnight: u64, offset: i64) -> LocalTimeBreakdown {
    classify(
      TimePoint(MIDNIGHT + secs_after_midnight),
      TimezoneOffset::new(offset).unwrap(),
    )
  }

  #[test]
  fn encoded_descriptor_has_expected_shape() {
    let b = breakdown(9 * 3600 + 4 * 60, -540);
    let uri = render(TokenId::new(5).unwrap(), &b).unwrap();
    assert!(uri.starts_with(DESCRIPTOR_PREFIX));

    let json = B64.decode(&uri[DESCRIPTOR_PREFIX.len()..]).unwrap();
    let json = String::from_utf8(json).unwrap();
    // Stable key order.
    let keys = ["\"name\"", "\"description\"", "\"image\"", "\"attributes\""];
    let positions: Vec<usize> = keys
      .iter()
      .map(|k| json.find(k).unwrap())
      .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");

    let meta = decode(&uri).unwrap();
    assert_eq!(meta.name, "Time NFT #5");
    assert!(meta.image.starts_with(image::IMAGE_PREFIX));
    assert_eq!(meta.attribute(traits::STATE), Some("Night"));
    assert_eq!(meta.attribute(traits::LOCAL_TIME), Some("00:04"));
    assert_eq!(meta.attribute(traits::UTC_TIME), Some("09:04"));
    assert_eq!(meta.attribute(traits::TIMEZONE), Some("UTC-9"));
    assert_eq!(meta.state(), Some(TimeState::Night));
  }

  #[test]
  fn timezone_attribute_keeps_sign_for_utc() {
    let meta = decode(&render(TokenId::FIRST, &breakdown(0, 0)).unwrap()).unwrap();
    assert_eq!(meta.attribute(traits::TIMEZONE), Some("UTC+0"));

    let meta = decode(&render(TokenId::FIRST, &breakdown(0, 330)).unwrap()).unwrap();
    assert_eq!(meta.attribute(traits::TIMEZONE), Some("UTC+5:30"));
  }

  #[test]
  fn same_inputs_give_identical_bytes() {
    let b = breakdown(13 * 3600, 60);
    let id = TokenId::new(9).unwrap();
    assert_eq!(render(id, &b).unwrap(), render(id, &b).unwrap());
  }

  #[test]
  fn different_states_give_different_images() {
    let id = TokenId::FIRST;
    let night = decode(&render(id, &breakdown(2 * 3600, 0)).unwrap()).unwrap();
    let day = decode(&render(id, &breakdown(14 * 3600, 0)).unwrap()).unwrap();
    assert_ne!(night.image, day.image);
  }

  #[test]
  fn constructed_descriptor_round_trips() {
    let d = MetadataDescriptor {
      name:        "Custom \"quoted\" name".into(),
      description: "Line one\nline two \u{2600}".into(),
      image:       image::data_uri("<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
      attributes:  vec![
        Attribute::new(traits::STATE, "Day"),
        Attribute::new("Extra", ""),
      ],
    };
    let decoded = decode(&encode_descriptor(&d).unwrap()).unwrap();
    assert_eq!(decoded, d);
    assert_eq!(decoded.image.as_bytes(), d.image.as_bytes());
  }

  #[test]
  fn decode_accepts_reformatted_json() {
    let d = MetadataDescriptor::new(
      TokenId::FIRST,
      &breakdown(0, 0),
      "data:image/svg+xml;base64,PHN2Zy8+",
    );
    let pretty = serde_json::to_string_pretty(&d).unwrap();
    let uri = format!("{DESCRIPTOR_PREFIX}{}", B64.encode(pretty));
    assert_eq!(decode(&uri).unwrap(), d);
  }

  #[test]
  fn decode_errors_are_distinct() {
    assert!(matches!(
      decode("data:text/plain;base64,e30="),
      Err(Error::BadPrefix { .. })
    ));
    assert!(matches!(
      decode("https://example.com/1.json"),
      Err(Error::BadPrefix { .. })
    ));
    assert!(matches!(
      decode("data:application/json;base64,not base64!"),
      Err(Error::BadBase64(_))
    ));

    let not_json = format!("{DESCRIPTOR_PREFIX}{}", B64.encode("{\"name\":"));
    assert!(matches!(decode(&not_json), Err(Error::MalformedJson(_))));

    let wrong_shape = format!("{DESCRIPTOR_PREFIX}{}", B64.encode("{\"name\":1}"));
    assert!(matches!(decode(&wrong_shape), Err(Error::MalformedJson(_))));

    let not_utf8 = format!("{DESCRIPTOR_PREFIX}{}", B64.encode([0xffu8, 0xfe, 0x00]));
    assert!(matches!(decode(&not_utf8), Err(Error::MalformedJson(_))));
  }

  #[test]
  fn prefix_match_is_exact() {
    let uri = render(TokenId::FIRST, &breakdown(0, 0)).unwrap();
    assert!(matches!(decode(&format!(" {uri}")), Err(Error::BadPrefix { .. })));
    let upper = uri.replacen("application/json", "APPLICATION/JSON", 1);
    assert!(matches!(decode(&upper), Err(Error::BadPrefix { .. })));
  }
}
