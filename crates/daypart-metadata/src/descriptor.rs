//! The metadata document carried inside a descriptor.

use daypart_core::{LocalTimeBreakdown, TimeState, TokenId};
use serde::{Deserialize, Serialize};

/// Trait names written into [`MetadataDescriptor::attributes`], in order.
pub mod traits {
  pub const STATE: &str = "Time State";
  pub const LOCAL_TIME: &str = "Local Time";
  pub const UTC_TIME: &str = "UTC Time";
  pub const TIMEZONE: &str = "Timezone";
}

/// A single `{ "trait_type", "value" }` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
  pub trait_type: String,
  pub value:      String,
}

impl Attribute {
  pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
    Self { trait_type: trait_type.into(), value: value.into() }
  }
}

/// Token metadata in the conventional NFT JSON shape.
///
/// Field order is the serialised key order and must not change: the ledger
/// and readers compare descriptors byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDescriptor {
  pub name:        String,
  pub description: String,
  /// A `data:image/svg+xml;base64,` URI.
  pub image:       String,
  pub attributes:  Vec<Attribute>,
}

impl MetadataDescriptor {
  /// Describe `token_id` as of `breakdown`, embedding `image` verbatim.
  pub fn new(
    token_id: TokenId,
    breakdown: &LocalTimeBreakdown,
    image: impl Into<String>,
  ) -> Self {
    Self {
      name:        format!("Time NFT #{}", token_id.get()),
      description: format!(
        "A dynamic collectible that follows the time of day in {}. It is \
         {} there, so the token shows its {} face.",
        breakdown.offset,
        breakdown.local_time(),
        breakdown.state.name().to_lowercase(),
      ),
      image:       image.into(),
      attributes:  vec![
        Attribute::new(traits::STATE, breakdown.state.name()),
        Attribute::new(traits::LOCAL_TIME, breakdown.local_time()),
        Attribute::new(traits::UTC_TIME, breakdown.utc_time()),
        Attribute::new(traits::TIMEZONE, breakdown.offset.to_string()),
      ],
    }
  }

  /// The value of the first attribute named `trait_type`.
  pub fn attribute(&self, trait_type: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|a| a.trait_type == trait_type)
      .map(|a| a.value.as_str())
  }

  /// The state recorded in the descriptor, if it names one of the three.
  pub fn state(&self) -> Option<TimeState> {
    self.attribute(traits::STATE).and_then(TimeState::from_name)
  }
}
