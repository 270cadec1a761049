//! Upstream payload types.
//!
//! These mirror the subset of the PokéAPI JSON shapes this crate consumes.
//! Deserialization is lenient: unknown fields are ignored and the sprite URL
//! may be `null`.

use serde::{Deserialize, Serialize};

/// A reference to a named API resource, e.g. a language, type or stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    /// Resource name, e.g. `"pikachu"` or `"ja-Hrkt"`.
    pub name: String,
    /// Canonical URL of the resource.
    #[serde(default)]
    pub url: String,
}

/// One localized display name, tagged with its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    /// The display name in `language`.
    pub name: String,
    /// Language tag resource, matched against the resolver's target locale.
    pub language: NamedResource,
}

/// The localized-names list of a species record.
///
/// Only `names` is deserialized; the species endpoint returns far more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesNames {
    /// All localized names the upstream knows for this species.
    pub names: Vec<LocalizedName>,
}

impl SpeciesNames {
    /// Returns the display name tagged with `locale`, if present.
    #[must_use]
    pub fn for_language(&self, locale: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.language.name == locale)
            .map(|n| n.name.as_str())
    }
}

/// Sprite URLs of a Pokémon. Entries are `null` upstream when no artwork
/// exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    /// Default front-facing sprite.
    pub front_default: Option<String>,
}

/// A Pokémon's slot-ordered type entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    /// Slot index (1-based).
    #[serde(default)]
    pub slot: u8,
    /// The type resource itself.
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// A single base-stat value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    /// The base value of the stat.
    pub base_stat: u32,
    /// The stat resource, e.g. `"hp"` or `"speed"`.
    pub stat: NamedResource,
}

/// A Pokémon record as returned by the `pokemon/{id-or-name}` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    /// National dex number.
    pub id: u32,
    /// English identifier, lower-cased upstream.
    pub name: String,
    /// Sprite URLs.
    #[serde(default)]
    pub sprites: Sprites,
    /// Types in slot order.
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    /// Base stats.
    #[serde(default)]
    pub stats: Vec<StatValue>,
}

/// One page of the paginated Pokémon list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonPage {
    /// Total number of Pokémon known upstream.
    #[serde(default)]
    pub count: u32,
    /// The entries of this page.
    pub results: Vec<NamedResource>,
}
