//! Lookup table over the catalog's shader definitions.

use catalog_shaders::SHADER_DEFINITIONS;
use shared::meta::ShaderDefinition;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown shader `{key}` (known: {known})")]
    UnknownShader { key: String, known: String },
    #[error("the catalog is empty")]
    Empty,
}

/// The definitions table plus a display ordering.
///
/// Indices handed out by the catalog are positions in the definitions table,
/// which is also what the GPU dispatches on.
#[derive(Clone)]
pub struct Catalog {
    definitions: &'static [ShaderDefinition],
    order: Vec<usize>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self::new(SHADER_DEFINITIONS)
    }

    pub fn new(definitions: &'static [ShaderDefinition]) -> Self {
        let mut order: Vec<usize> = (0..definitions.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&definitions[a], &definitions[b]);
            a.sort.cmp(&b.sort).then_with(|| a.name.cmp(b.name))
        });
        Self { definitions, order }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &'static [ShaderDefinition] {
        self.definitions
    }

    pub fn definition(&self, index: usize) -> &'static ShaderDefinition {
        &self.definitions[index]
    }

    pub fn index_of(&self, key: &str) -> Result<usize, CatalogError> {
        self.definitions
            .iter()
            .position(|definition| definition.key == key)
            .ok_or_else(|| CatalogError::UnknownShader {
                key: key.to_string(),
                known: self
                    .sorted()
                    .map(|(_, definition)| definition.key)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn get(&self, key: &str) -> Result<&'static ShaderDefinition, CatalogError> {
        self.index_of(key).map(|index| self.definition(index))
    }

    /// Definitions in display order (sort key, then name).
    pub fn sorted(&self) -> impl Iterator<Item = (usize, &'static ShaderDefinition)> + '_ {
        let definitions = self.definitions;
        self.order.iter().map(move |&index| (index, &definitions[index]))
    }

    /// First unit in display order.
    pub fn first(&self) -> Result<usize, CatalogError> {
        self.order.first().copied().ok_or(CatalogError::Empty)
    }

    /// The unit after `index` in display order, wrapping around.
    pub fn next(&self, index: usize) -> usize {
        self.step(index, 1)
    }

    /// The unit before `index` in display order, wrapping around.
    pub fn previous(&self, index: usize) -> usize {
        self.step(index, self.order.len().saturating_sub(1))
    }

    /// Unknown indices, including any index into an empty catalog, stay put.
    fn step(&self, index: usize, by: usize) -> usize {
        match self.order.iter().position(|&i| i == index) {
            Some(position) => self.order[(position + by) % self.order.len()],
            None => index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::meta::{BufferFormat, IMAGE_ONLY};

    const fn unit(key: &'static str, name: &'static str, sort: u32) -> ShaderDefinition {
        ShaderDefinition {
            key,
            name,
            sort,
            buffer_format: BufferFormat::Unorm8,
            passes: IMAGE_ONLY,
            params: &[],
        }
    }

    static UNITS: [ShaderDefinition; 4] = [
        unit("zeta", "Zeta", 20),
        unit("alpha", "Alpha", 10),
        unit("beta", "Beta", 20),
        unit("gamma", "Gamma", 5),
    ];

    #[test]
    fn sorts_by_sort_key_then_name() {
        let catalog = Catalog::new(&UNITS);
        let keys: Vec<_> = catalog.sorted().map(|(_, d)| d.key).collect();
        assert_eq!(keys, ["gamma", "alpha", "beta", "zeta"]);
        assert_eq!(catalog.first().unwrap(), 3);
    }

    #[test]
    fn navigation_wraps_in_display_order() {
        let catalog = Catalog::new(&UNITS);
        let zeta = catalog.index_of("zeta").unwrap();
        let gamma = catalog.index_of("gamma").unwrap();
        assert_eq!(catalog.next(zeta), gamma);
        assert_eq!(catalog.previous(gamma), zeta);
        assert_eq!(catalog.next(gamma), catalog.index_of("alpha").unwrap());
    }

    #[test]
    fn navigation_on_empty_catalog_stays_put() {
        let catalog = Catalog::new(&[]);
        assert!(matches!(catalog.first(), Err(CatalogError::Empty)));
        assert_eq!(catalog.next(0), 0);
        assert_eq!(catalog.previous(0), 0);
        assert_eq!(catalog.previous(7), 7);
    }

    #[test]
    fn unknown_key_lists_known_keys() {
        let catalog = Catalog::new(&UNITS);
        let err = catalog.get("delta").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown shader `delta`"));
        assert!(message.contains("gamma, alpha, beta, zeta"));
    }

    #[test]
    fn builtin_catalog_resolves_every_key() {
        let catalog = Catalog::builtin();
        assert!(!catalog.is_empty());
        for (index, definition) in catalog.sorted() {
            assert_eq!(catalog.index_of(definition.key).unwrap(), index);
        }
    }
}
