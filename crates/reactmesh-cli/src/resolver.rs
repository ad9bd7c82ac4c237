use crate::config::LibraryConfig;
use reactmesh::core::io::sdf::SdfFile;
use reactmesh::core::models::structure::Structure;
use reactmesh::core::utils::paths::normalize_key;
use reactmesh::engine::collaborators::{ResolutionError, StructureResolver};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const EXTENSIONS: [&str; 2] = ["sdf", "mol"];

/// Resolves identifiers to molfiles stored in local library directories.
///
/// `<key>.sdf` is preferred over `<key>.mol`, and earlier directories win. An alias
/// redirects an identifier to another file stem before the lookup.
#[derive(Debug, Clone)]
pub struct LibraryResolver {
    dirs: Vec<PathBuf>,
    aliases: HashMap<String, String>,
}

impl LibraryResolver {
    pub fn new(library: &LibraryConfig) -> Self {
        Self {
            dirs: library.dirs.clone(),
            aliases: library
                .aliases
                .iter()
                .map(|(from, to)| (alias_key(from), to.clone()))
                .collect(),
        }
    }

    fn stems(&self, identifier: &str) -> Vec<String> {
        let key = normalize_key(identifier.trim());
        let mut stems = Vec::with_capacity(3);
        if let Some(target) = self.aliases.get(&alias_key(identifier)) {
            stems.push(normalize_key(target));
        }
        stems.push(key.clone());
        let lower = key.to_ascii_lowercase();
        if lower != key {
            stems.push(lower);
        }
        stems.dedup();
        stems
    }

    /// First library file matching `identifier`, if any.
    pub fn locate(&self, identifier: &str) -> Option<PathBuf> {
        for stem in self.stems(identifier) {
            for dir in &self.dirs {
                for ext in EXTENSIONS {
                    let candidate = dir.join(format!("{stem}.{ext}"));
                    trace!("Probing {:?}", candidate);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

fn alias_key(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

fn read_structure(path: &Path) -> Result<Structure, ResolutionError> {
    SdfFile::read_from_path(path).map_err(|e| {
        ResolutionError::with_source(format!("failed to read {}", path.display()), e)
    })
}

impl StructureResolver for LibraryResolver {
    fn resolve(&self, identifier: &str) -> Result<Option<Structure>, ResolutionError> {
        match self.locate(identifier) {
            Some(path) => {
                debug!("Resolved '{}' to {:?}", identifier, path);
                read_structure(&path).map(Some)
            }
            None => {
                debug!("No library file for '{}'", identifier);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    const WATER: &str = "\
water
  reactmesh

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.1173 O   0  0  0  0  0  0  0  0  0  0  0  0
    0.0000    0.7572   -0.4692 H   0  0  0  0  0  0  0  0  0  0  0  0
    0.0000   -0.7572   -0.4692 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  1  3  1  0
M  END
$$$$
";

    fn resolver(dirs: Vec<PathBuf>, aliases: &[(&str, &str)]) -> LibraryResolver {
        LibraryResolver::new(&LibraryConfig {
            dirs,
            aliases: aliases
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect::<BTreeMap<_, _>>(),
        })
    }

    #[test]
    fn resolves_by_key_and_alias() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("H2O.sdf"), WATER).unwrap();
        let r = resolver(vec![dir.path().to_path_buf()], &[("Water", "H2O")]);

        let by_key = r.resolve("H2O").unwrap().unwrap();
        assert_eq!(by_key.atoms().len(), 3);
        let by_alias = r.resolve(" water ").unwrap().unwrap();
        assert_eq!(by_alias, by_key);
    }

    #[test]
    fn falls_back_to_lowercase_stem_and_mol_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("methanol.mol"), WATER).unwrap();
        let r = resolver(vec![dir.path().to_path_buf()], &[]);
        assert_eq!(r.locate("Methanol"), Some(dir.path().join("methanol.mol")));
    }

    #[test]
    fn earlier_directories_win() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("x.mol"), WATER).unwrap();
        fs::write(second.path().join("x.sdf"), WATER).unwrap();
        let r = resolver(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            &[],
        );
        assert_eq!(r.locate("x"), Some(first.path().join("x.mol")));
    }

    #[test]
    fn unknown_identifier_is_none() {
        let dir = tempdir().unwrap();
        let r = resolver(vec![dir.path().to_path_buf()], &[]);
        assert!(r.resolve("unobtainium").unwrap().is_none());
    }

    #[test]
    fn unreadable_file_is_a_resolution_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.sdf"), "bad\n\n\nnot a counts line\n").unwrap();
        let r = resolver(vec![dir.path().to_path_buf()], &[]);
        let err = r.resolve("bad").unwrap_err();
        assert!(err.to_string().contains("bad.sdf"));
    }

    #[test]
    fn identifiers_cannot_escape_the_library() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(dir.path().join("secret.sdf"), WATER).unwrap();
        let r = resolver(vec![lib], &[]);
        assert!(r.resolve("../secret").unwrap().is_none());
    }
}
