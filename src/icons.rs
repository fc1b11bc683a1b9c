use crate::error::{DepictError, Result};
use regex::Regex;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use walkdir::WalkDir;

/// Catalog name of the entry used when nothing matches.
pub const BLANK_ICON: &str = "generic/blank/blank";

/// Providers in increasing preference; unlisted providers rank lowest.
const PROVIDER_PREFERENCE: [&str; 10] = [
    "openstack",
    "saas",
    "elastic",
    "oci",
    "generic",
    "programming",
    "onprem",
    "gcp",
    "k8s",
    "aws",
];

/// Maps a node's icon name to an asset reference. Must be total and return
/// the same answer for the same name, since layout asks again on every edit.
pub trait IconResolver {
    fn resolve(&self, name: &str) -> String;
}

/// Resolves every name to the empty asset, so no image is drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankIcons;

impl IconResolver for BlankIcons {
    fn resolve(&self, _name: &str) -> String {
        String::new()
    }
}

/// A fixed set of icons, looked up by fuzzy name so that anything typed
/// lands on a near match.
#[derive(Debug, Default)]
pub struct IconCatalog {
    /// Catalog name (`provider/group/icon`) to asset reference.
    entries: BTreeMap<String, String>,
    cache: Mutex<HashMap<String, String>>,
}

impl IconCatalog {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Collects every `*.png` under `root`, named by its path relative to
    /// `root` without the extension.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();
        collect_pngs(root, &mut entries)?;
        debug!(root = %root.display(), icons = entries.len(), "loaded icon catalog");
        Ok(Self {
            entries,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best catalog name for `key`: the shortest span containing the typed
    /// characters in order, then the preferred provider, then the shortest
    /// name.
    pub fn best_match(&self, key: &str) -> Option<&str> {
        let key = if key.is_empty() { "blank" } else { key };
        let pattern: Vec<String> = key
            .chars()
            .map(|ch| regex::escape(&ch.to_string()))
            .collect();
        let regex = Regex::new(&format!("(?i).*({})", pattern.join(".*"))).ok()?;

        self.entries
            .keys()
            .map(|name| {
                let rank = match regex.captures(name).and_then(|caps| caps.get(1)) {
                    Some(span) => (span.len(), Reverse(provider_rank(name)), name.len()),
                    None if name == BLANK_ICON => (usize::MAX - 1, Reverse(0), 0),
                    None => (usize::MAX, Reverse(0), 0),
                };
                (rank, name.as_str())
            })
            .min()
            .map(|(_, name)| name)
    }

    fn lookup(&self, key: &str) -> String {
        self.best_match(key)
            .and_then(|name| self.entries.get(name))
            .cloned()
            .unwrap_or_default()
    }
}

impl IconResolver for IconCatalog {
    fn resolve(&self, name: &str) -> String {
        if let Ok(cache) = self.cache.lock()
            && let Some(hit) = cache.get(name)
        {
            return hit.clone();
        }
        let resolved = self.lookup(name);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), resolved.clone());
        }
        resolved
    }
}

fn provider_rank(name: &str) -> i32 {
    let provider = name.split('/').next().unwrap_or_default();
    PROVIDER_PREFERENCE
        .iter()
        .position(|p| *p == provider)
        .map(|idx| idx as i32)
        .unwrap_or(-1)
}

fn collect_pngs(root: &Path, out: &mut BTreeMap<String, String>) -> Result<()> {
    // Symlinked directories are not entered.
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|err| DepictError::Read {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            continue;
        }
        let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf) else {
            continue;
        };
        let name: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        out.insert(name.join("/"), path.to_string_lossy().into_owned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IconCatalog {
        IconCatalog::new([
            ("aws/compute/ec2", "res/aws/compute/ec2.png"),
            ("gcp/compute/gce", "res/gcp/compute/gce.png"),
            ("openstack/compute/nova", "res/openstack/compute/nova.png"),
            ("aws/database/rds", "res/aws/database/rds.png"),
            ("gcp/database/sql", "res/gcp/database/sql.png"),
            ("generic/blank/blank", "res/generic/blank/blank.png"),
            ("generic/network/firewall", "res/generic/network/firewall.png"),
        ])
    }

    #[test]
    fn exact_names_win() {
        assert_eq!(catalog().resolve("ec2"), "res/aws/compute/ec2.png");
        assert_eq!(catalog().resolve("RDS"), "res/aws/database/rds.png");
    }

    #[test]
    fn scattered_letters_still_match() {
        assert_eq!(catalog().best_match("fwall"), Some("generic/network/firewall"));
    }

    #[test]
    fn preferred_provider_breaks_ties() {
        // "compute" spans the same length in every provider.
        assert_eq!(catalog().best_match("compute"), Some("aws/compute/ec2"));
    }

    #[test]
    fn unknown_and_empty_names_fall_back_to_blank() {
        let icons = catalog();
        assert_eq!(icons.resolve(""), "res/generic/blank/blank.png");
        assert_eq!(icons.resolve("zzzzqqq"), "res/generic/blank/blank.png");
        assert_eq!(IconCatalog::default().resolve("ec2"), "");
    }

    #[test]
    fn lookups_are_memoized() {
        let icons = catalog();
        let first = icons.resolve("sql");
        assert_eq!(icons.resolve("sql"), first);
        assert!(icons.cache.lock().expect("cache").contains_key("sql"));
    }

    fn write_file(path: &Path) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, b"png").expect("write icon");
    }

    #[test]
    fn from_dir_names_icons_by_relative_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write_file(&root.join("aws/compute/ec2.png"));
        write_file(&root.join("gcp/database/SQL.PNG"));
        write_file(&root.join("aws/compute/README.md"));
        write_file(&root.join("generic/blank/blank.png"));

        let icons = IconCatalog::from_dir(root).expect("scan");
        assert_eq!(icons.len(), 3);
        let names: Vec<&str> = icons.entries.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["aws/compute/ec2", "gcp/database/SQL", "generic/blank/blank"]
        );
        assert_eq!(
            icons.resolve("ec2"),
            root.join("aws/compute/ec2.png").to_string_lossy()
        );
    }

    #[cfg(unix)]
    #[test]
    fn from_dir_does_not_follow_symlink_cycles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write_file(&root.join("aws/compute/ec2.png"));
        std::os::unix::fs::symlink(root, root.join("aws/loop")).expect("symlink");

        let icons = IconCatalog::from_dir(root).expect("scan");
        assert_eq!(icons.len(), 1);
        assert_eq!(icons.best_match("ec2"), Some("aws/compute/ec2"));
    }

    #[test]
    fn from_dir_reports_a_missing_root() {
        let err = IconCatalog::from_dir(Path::new("/nonexistent/depict-icons")).unwrap_err();
        assert!(matches!(err, DepictError::Read { .. }));
    }
}
