//! SVG artwork for each time state.
//!
//! Output is a pure function of `(token_id, breakdown)`: integer coordinates
//! only, fixed attribute order, no randomness. The ledger and any reader
//! must produce the same bytes.

use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use daypart_core::{LocalTimeBreakdown, TimeState, TokenId};

use crate::error::{Error, Result};

/// Scheme prefix of the embedded image.
pub const IMAGE_PREFIX: &str = "data:image/svg+xml;base64,";

const SIZE: u32 = 400;

// ─── Palettes ────────────────────────────────────────────────────────────────

/// Visual parameters selected by [`TimeState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
  pub sky_top:     &'static str,
  pub sky_bottom:  &'static str,
  pub orb:         &'static str,
  pub glow:        &'static str,
  /// `stdDeviation` of the glow blur.
  pub glow_radius: u8,
  /// Vertical centre of the sun or moon.
  pub orb_y:       u32,
  pub text:        &'static str,
  pub stars:       bool,
}

impl Palette {
  pub fn for_state(state: TimeState) -> Self {
    match state {
      TimeState::Night => Self {
        sky_top:     "#0b1026",
        sky_bottom:  "#2b1055",
        orb:         "#f4f1c9",
        glow:        "#c9d6ff",
        glow_radius: 12,
        orb_y:       120,
        text:        "#e0e6ff",
        stars:       true,
      },
      TimeState::Morning => Self {
        sky_top:     "#ff9966",
        sky_bottom:  "#ffd194",
        orb:         "#ffb347",
        glow:        "#ffe0a3",
        glow_radius: 8,
        orb_y:       260,
        text:        "#5a2a00",
        stars:       false,
      },
      TimeState::Day => Self {
        sky_top:     "#4facfe",
        sky_bottom:  "#a1e3ff",
        orb:         "#ffd700",
        glow:        "#fff6b0",
        glow_radius: 16,
        orb_y:       100,
        text:        "#073b5c",
        stars:       false,
      },
    }
  }
}

/// Fixed star field for the night sky.
const STARS: [(u32, u32, u32); 8] = [
  (40, 50, 2),
  (95, 180, 1),
  (150, 40, 2),
  (230, 95, 1),
  (300, 30, 2),
  (355, 150, 1),
  (60, 250, 1),
  (330, 230, 2),
];

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Render the artwork for `token_id` in the state described by `breakdown`.
pub fn render_svg(token_id: TokenId, breakdown: &LocalTimeBreakdown) -> String {
  let p = Palette::for_state(breakdown.state);
  let mut svg = String::with_capacity(2048);

  // `write!` into a `String` cannot fail.
  let _ = write!(
    svg,
    "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SIZE}\" \
     height=\"{SIZE}\" viewBox=\"0 0 {SIZE} {SIZE}\">\
     <defs>\
     <linearGradient id=\"sky\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">\
     <stop offset=\"0%\" stop-color=\"{top}\"/>\
     <stop offset=\"100%\" stop-color=\"{bottom}\"/>\
     </linearGradient>\
     <filter id=\"glow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
     <feGaussianBlur stdDeviation=\"{blur}\" result=\"blur\"/>\
     <feMerge><feMergeNode in=\"blur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge>\
     </filter>\
     </defs>\
     <rect width=\"{SIZE}\" height=\"{SIZE}\" fill=\"url(#sky)\"/>",
    top = p.sky_top,
    bottom = p.sky_bottom,
    blur = p.glow_radius,
  );

  if p.stars {
    for (x, y, r) in STARS {
      let _ = write!(
        svg,
        "<circle cx=\"{x}\" cy=\"{y}\" r=\"{r}\" fill=\"#ffffff\"/>"
      );
    }
  }

  let _ = write!(
    svg,
    "<circle cx=\"200\" cy=\"{y}\" r=\"60\" fill=\"{glow}\" opacity=\"0.35\" \
     filter=\"url(#glow)\"/>\
     <circle cx=\"200\" cy=\"{y}\" r=\"44\" fill=\"{orb}\" filter=\"url(#glow)\"/>",
    y = p.orb_y,
    glow = p.glow,
    orb = p.orb,
  );

  if breakdown.state == TimeState::Night {
    // Crescent: shadow disc offset over the moon.
    let _ = write!(
      svg,
      "<circle cx=\"222\" cy=\"{y}\" r=\"40\" fill=\"{shadow}\"/>",
      y = p.orb_y - 10,
      shadow = p.sky_top,
    );
  }

  if breakdown.state == TimeState::Morning {
    let _ = write!(
      svg,
      "<rect y=\"280\" width=\"{SIZE}\" height=\"120\" fill=\"{}\" \
       opacity=\"0.6\"/>",
      p.sky_top,
    );
  }

  let _ = write!(
    svg,
    "<g font-family=\"monospace\" fill=\"{color}\" text-anchor=\"middle\">\
     <text x=\"200\" y=\"330\" font-size=\"40\">{time}</text>\
     <text x=\"200\" y=\"362\" font-size=\"18\">{state} \u{b7} {offset}</text>\
     <text x=\"200\" y=\"388\" font-size=\"14\">Time NFT #{id}</text>\
     </g></svg>",
    color = p.text,
    time = breakdown.local_time(),
    state = breakdown.state,
    offset = breakdown.offset,
    id = token_id.get(),
  );

  svg
}

/// Wrap an SVG document as a base64 data URI.
pub fn data_uri(svg: &str) -> String {
  format!("{IMAGE_PREFIX}{}", B64.encode(svg))
}

/// Inverse of [`data_uri`].
pub fn decode_data_uri(uri: &str) -> Result<String> {
  let payload = uri
    .strip_prefix(IMAGE_PREFIX)
    .ok_or(Error::BadPrefix { expected: IMAGE_PREFIX })?;
  let bytes = B64.decode(payload).map_err(Error::BadBase64)?;
  Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
  use daypart_core::{TimePoint, TimezoneOffset, classify};

  use super::*;

  fn breakdown_at(hour: u64) -> LocalTimeBreakdown {
    classify(TimePoint(1_717_200_000 + hour * 3600), TimezoneOffset::UTC)
  }

  #[test]
  fn palette_follows_state() {
    let night = render_svg(TokenId::FIRST, &breakdown_at(23));
    let morning = render_svg(TokenId::FIRST, &breakdown_at(7));
    let day = render_svg(TokenId::FIRST, &breakdown_at(15));

    assert!(night.contains("#0b1026") && night.contains("stdDeviation=\"12\""));
    assert!(morning.contains("#ff9966") && morning.contains("stdDeviation=\"8\""));
    assert!(day.contains("#4facfe") && day.contains("stdDeviation=\"16\""));
    assert!(night.contains("fill=\"#ffffff\""));
    assert!(!day.contains("fill=\"#ffffff\""));
  }

  #[test]
  fn svg_shows_local_time_and_offset() {
    let b = classify(
      TimePoint(1_717_200_000 + 3 * 3600 + 5 * 60),
      TimezoneOffset::new(330).unwrap(),
    );
    let svg = render_svg(TokenId::new(12).unwrap(), &b);
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(">08:35<"));
    assert!(svg.contains("Morning \u{b7} UTC+5:30"));
    assert!(svg.contains("Time NFT #12"));
  }

  #[test]
  fn rendering_is_deterministic() {
    let b = breakdown_at(18);
    let id = TokenId::new(3).unwrap();
    assert_eq!(render_svg(id, &b), render_svg(id, &b));
  }

  #[test]
  fn data_uri_round_trips_bytes() {
    let svg = render_svg(TokenId::FIRST, &breakdown_at(1));
    let uri = data_uri(&svg);
    assert!(uri.starts_with(IMAGE_PREFIX));
    assert_eq!(decode_data_uri(&uri).unwrap(), svg);
  }

  #[test]
  fn decode_data_uri_rejects_other_schemes() {
    assert!(matches!(
      decode_data_uri("data:image/png;base64,AAAA"),
      Err(Error::BadPrefix { .. })
    ));
    assert!(matches!(
      decode_data_uri("data:image/svg+xml;base64,@@@"),
      Err(Error::BadBase64(_))
    ));
  }
}
