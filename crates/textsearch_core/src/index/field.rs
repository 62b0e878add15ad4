//! Compiled per-field indexes and key naming.

use crate::config::{IndexDefinition, SearchConfig};
use crate::entity::{EntityId, FieldValue};
use crate::error::{SearchError, SearchResult};
use crate::index::expander::PrefixExpander;
use crate::index::tokenizer::{normalize, Tokenizer};
use std::collections::HashSet;

/// One indexed field, ready to turn values into keys.
#[derive(Debug, Clone)]
pub struct FieldIndex {
    definition: IndexDefinition,
    key: String,
    exclude: HashSet<String>,
}

impl FieldIndex {
    fn compile(type_prefix: &str, definition: IndexDefinition, global_exclude: &[String]) -> Self {
        let key = format!("{}:text_index:{}", type_prefix, definition.field);
        let exclude = global_exclude
            .iter()
            .chain(&definition.exclude)
            .map(|w| w.to_lowercase())
            .collect();

        Self {
            definition,
            key,
            exclude,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.definition.field
    }

    /// Returns the key prefix shared by every index key of this field.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the definition this index was compiled from.
    #[must_use]
    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    /// Returns the tokenizer configured for this field.
    #[must_use]
    pub fn tokenizer(&self) -> Tokenizer<'_> {
        Tokenizer::new(&self.definition.split, self.definition.minlength, &self.exclude)
    }

    /// Returns the prefix expander configured for this field.
    #[must_use]
    pub fn expander(&self) -> PrefixExpander<'_> {
        let def = &self.definition;
        PrefixExpander::new(&self.key, def.minlength, def.exact, def.full)
    }

    /// Computes every index key asserting `value`, in first-seen order.
    #[must_use]
    pub fn index_keys(&self, value: &FieldValue) -> Vec<String> {
        self.expander().expand(self.tokenizer().tokens(value))
    }

    /// Computes the single index key a search value is looked up under.
    ///
    /// Search values are normalized exactly like indexed tokens but neither
    /// split, length-checked nor excluded.
    #[must_use]
    pub fn query_key(&self, value: &str) -> String {
        self.expander().key_for(&normalize(value))
    }
}

/// The compiled, immutable set of field indexes for one entity type.
#[derive(Debug, Clone)]
pub struct TextIndexes {
    entity_type: String,
    type_prefix: String,
    fields: Vec<FieldIndex>,
}

impl TextIndexes {
    /// Validates `config` and compiles its index definitions.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Configuration`] if no field is indexed, a field
    /// is declared twice or has an empty name, or a `minlength` is zero.
    pub fn compile(config: &SearchConfig) -> SearchResult<Self> {
        if config.indexes.is_empty() {
            return Err(SearchError::configuration(format!(
                "no text indexes declared for {}",
                config.entity_type
            )));
        }

        let type_prefix = config.type_prefix();
        if type_prefix.is_empty() {
            return Err(SearchError::configuration("key prefix must not be empty"));
        }

        let mut names = HashSet::new();
        let mut fields = Vec::with_capacity(config.indexes.len());
        for def in &config.indexes {
            if def.field.is_empty() {
                return Err(SearchError::configuration("indexed field name must not be empty"));
            }
            if def.minlength == 0 {
                return Err(SearchError::configuration(format!(
                    "minlength for field `{}` must be at least 1",
                    def.field
                )));
            }
            if !names.insert(def.field.as_str()) {
                return Err(SearchError::configuration(format!(
                    "field `{}` is indexed more than once",
                    def.field
                )));
            }
            fields.push(FieldIndex::compile(&type_prefix, def.clone(), &config.exclude_list));
        }

        Ok(Self {
            entity_type: config.entity_type.clone(),
            type_prefix,
            fields,
        })
    }

    /// Returns the entity type name.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Returns the key prefix of the entity type.
    #[must_use]
    pub fn type_prefix(&self) -> &str {
        &self.type_prefix
    }

    /// Looks up the index for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownField`] if the field is not indexed.
    pub fn get(&self, field: &str) -> SearchResult<&FieldIndex> {
        self.fields
            .iter()
            .find(|f| f.field() == field)
            .ok_or_else(|| SearchError::unknown_field(field))
    }

    /// Iterates over all field indexes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldIndex> {
        self.fields.iter()
    }

    /// Returns all indexed field names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldIndex::field).collect()
    }

    /// Returns the key of the reverse map for one entity and field.
    #[must_use]
    pub fn reverse_map_key(&self, id: &EntityId, field: &str) -> String {
        format!("{}:{}:{}_indexes", self.type_prefix, id, field)
    }
}
