//! Class-map index for autoloading ecosystems
//!
//! Merges per-module PSR-4 autoload rules into a single
//! fully-qualified-symbol -> file-path index over the installed vendor
//! tree. Written to `vendor/classmap.json` after the install barrier.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, VendoError};
use crate::lock::Module;

/// On-disk artifact path relative to the project root
pub const CLASSMAP_PATH: &str = "vendor/classmap.json";

/// Extension marking a loadable source unit
const SOURCE_EXT: &str = ".php";

/// Symbol-name -> repository-relative file path
#[derive(Debug, Default)]
pub struct ClassMap {
    entries: BTreeMap<String, String>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; later insertions overwrite earlier ones
    /// silently on key collision (last-write-wins, arrival-ordered).
    pub fn insert(&mut self, symbol: String, path: String) {
        self.entries.insert(symbol, path);
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another map into this one, overwriting on collision
    pub fn merge(&mut self, other: ClassMap) {
        self.entries.extend(other.entries);
    }

    /// Build a module's contribution by scanning its installed tree
    ///
    /// Every `.php` file under one of the module's declared PSR-4 roots
    /// yields one entry; modules without autoload rules contribute
    /// nothing.
    pub fn from_installed_module(root: &Path, module: &Module) -> Self {
        let mut map = Self::new();
        if module.autoload.psr4.is_empty() {
            return map;
        }

        let module_dir = root.join("vendor").join(&module.name);
        for entry in WalkDir::new(&module_dir)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let Ok(relative) = entry.path().strip_prefix(&module_dir) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            if let Some((symbol, path)) = symbol_for(module, &relative) {
                map.insert(symbol, path);
            }
        }

        map
    }

    /// Write the index as pretty JSON, sorted by symbol name
    pub fn flush(&self, root: &Path) -> Result<()> {
        let path = root.join(CLASSMAP_PATH);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| VendoError::io(parent.display().to_string(), e))?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            VendoError::StateWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        fs::write(&path, json).map_err(|e| VendoError::io(path.display().to_string(), e))
    }
}

/// Map one module-relative file path to its fully-qualified symbol
///
/// The path must carry the source extension and fall under one of the
/// module's PSR-4 roots: strip the root, translate `/` to `\`, drop the
/// extension, prepend the rule's namespace prefix. Rules that leave no
/// symbol name below the root (e.g. a root declared as a file path) are
/// skipped.
fn symbol_for(module: &Module, relative: &str) -> Option<(String, String)> {
    for (prefix, rule_root) in &module.autoload.psr4 {
        let Some(below_root) = relative.strip_prefix(rule_root.as_str()) else {
            continue;
        };
        let Some(trimmed) = below_root.strip_suffix(SOURCE_EXT) else {
            continue;
        };
        let symbol = format!("{}{}", prefix, trimmed.replace('/', "\\"));
        let path = format!("vendor/{}/{}", module.name, relative);
        return Some((symbol, path));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn psr4_module(name: &str, prefix: &str, rule_root: &str) -> Module {
        let mut module = Module {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            ..Module::default()
        };
        module
            .autoload
            .psr4
            .insert(prefix.to_string(), rule_root.to_string());
        module
    }

    #[test]
    fn test_symbol_for_basic() {
        let module = psr4_module("acme/widget", "Acme\\Widget\\", "src/");
        let (symbol, path) = symbol_for(&module, "src/Gear/Spinner.php").unwrap();
        assert_eq!(symbol, "Acme\\Widget\\Gear\\Spinner");
        assert_eq!(path, "vendor/acme/widget/src/Gear/Spinner.php");
    }

    #[test]
    fn test_symbol_for_skips_non_source_files() {
        let module = psr4_module("acme/widget", "Acme\\Widget\\", "src/");
        assert!(symbol_for(&module, "src/notes.md").is_none());
        assert!(symbol_for(&module, "README").is_none());
    }

    #[test]
    fn test_rule_root_declared_as_file_path_is_skipped() {
        // Lock files can legally declare a PSR-4 root pointing at a
        // file; no symbol remains below such a root.
        let module = psr4_module("acme/widget", "Acme\\", "src/Widget.php");
        assert!(symbol_for(&module, "src/Widget.php").is_none());
        assert!(symbol_for(&module, "src/Other.php").is_none());
    }

    #[test]
    fn test_scan_survives_file_path_rule_root() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("vendor/acme/widget/src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Widget.php"), "<?php class Widget {}").unwrap();

        let module = psr4_module("acme/widget", "Acme\\", "src/Widget.php");
        let map = ClassMap::from_installed_module(temp.path(), &module);
        assert!(map.is_empty());
    }

    #[test]
    fn test_symbol_for_skips_files_outside_roots() {
        let module = psr4_module("acme/widget", "Acme\\Widget\\", "src/");
        assert!(symbol_for(&module, "tests/SpinnerTest.php").is_none());
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut first = ClassMap::new();
        first.insert("Acme\\Thing".to_string(), "vendor/a/src/Thing.php".to_string());

        let mut second = ClassMap::new();
        second.insert("Acme\\Thing".to_string(), "vendor/b/src/Thing.php".to_string());

        first.merge(second);
        assert_eq!(first.len(), 1);
        assert_eq!(first.get("Acme\\Thing").unwrap(), "vendor/b/src/Thing.php");
    }

    #[test]
    fn test_from_installed_module_scans_tree() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("vendor/acme/widget/src/Gear");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Spinner.php"), "<?php class Spinner {}").unwrap();
        fs::write(src.join("notes.txt"), "not a class").unwrap();
        fs::write(
            temp.path().join("vendor/acme/widget/src/Widget.php"),
            "<?php class Widget {}",
        )
        .unwrap();

        let module = psr4_module("acme/widget", "Acme\\Widget\\", "src/");
        let map = ClassMap::from_installed_module(temp.path(), &module);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("Acme\\Widget\\Gear\\Spinner").unwrap(),
            "vendor/acme/widget/src/Gear/Spinner.php"
        );
        assert_eq!(
            map.get("Acme\\Widget\\Widget").unwrap(),
            "vendor/acme/widget/src/Widget.php"
        );
    }

    #[test]
    fn test_module_without_rules_contributes_nothing() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("vendor/acme/plain");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Thing.php"), "<?php").unwrap();

        let module = Module {
            name: "acme/plain".to_string(),
            ..Module::default()
        };
        let map = ClassMap::from_installed_module(temp.path(), &module);
        assert!(map.is_empty());
    }

    #[test]
    fn test_flush_writes_sorted_json() {
        let temp = tempdir().unwrap();
        let mut map = ClassMap::new();
        map.insert("B\\Two".to_string(), "vendor/b/src/Two.php".to_string());
        map.insert("A\\One".to_string(), "vendor/a/src/One.php".to_string());
        map.flush(temp.path()).unwrap();

        let contents = fs::read_to_string(temp.path().join(CLASSMAP_PATH)).unwrap();
        let a = contents.find("A\\\\One").unwrap();
        let b = contents.find("B\\\\Two").unwrap();
        assert!(a < b);
    }
}
