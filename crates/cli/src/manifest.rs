use anyhow::{Context, Result, bail};
use convoke_argparse::{Catalog, HYPHEN_CASE};
use convoke_metadata::{CatalogManifest, CommandDecl, DEFAULT_CATALOG_NAME, action, command, param};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the catalog file when `--catalog` is absent.
pub const CATALOG_ENV: &str = "CONVOKE_CATALOG";

#[derive(Debug)]
pub struct LoadedCatalog {
    pub path: PathBuf,
    pub manifest: CatalogManifest,
}

impl LoadedCatalog {
    pub fn build(&self) -> Result<Catalog> {
        Catalog::from_decl(&self.manifest.root)
            .with_context(|| format!("invalid catalog: {}", self.path.display()))
    }
}

/// Locate the catalog: `--catalog`, then `$CONVOKE_CATALOG`, then `./convoke.json`.
pub fn locate_catalog(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let from_env = std::env::var_os(CATALOG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let (path, source) = match (explicit, from_env) {
        (Some(p), _) => (resolve_against(&cwd, p), "--catalog"),
        (None, Some(p)) => (resolve_against(&cwd, &p), CATALOG_ENV),
        (None, None) => (cwd.join(DEFAULT_CATALOG_NAME), "current directory"),
    };

    if !path.is_file() {
        bail!("catalog not found: {} (from {source})", path.display());
    }
    tracing::debug!(path = %path.display(), source, "using catalog");
    Ok(path)
}

pub fn load_catalog(explicit: Option<&Path>) -> Result<LoadedCatalog> {
    let path = locate_catalog(explicit)?;
    let manifest = CatalogManifest::from_file(&path)
        .with_context(|| format!("failed to load catalog: {}", path.display()))?;
    Ok(LoadedCatalog { path, manifest })
}

/// Write a sample catalog into `project_dir`, keeping an existing one unless
/// `overwrite` is set.
pub fn write_default_manifest(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_CATALOG_NAME);
    if dest.exists() && !overwrite {
        return Ok(dest);
    }

    let project_name = guess_project_name(project_dir).unwrap_or_else(|| "my-cli".to_string());
    let manifest = CatalogManifest::new(sample_catalog(&project_name));

    let mut out = manifest
        .to_json_pretty()
        .context("failed to serialize catalog")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

pub fn sample_catalog(project_name: &str) -> CommandDecl {
    command("")
        .description(format!("{project_name} command catalog"))
        .shared(param("verbose").alias("v").switch().description("Print more detail"))
        .action(
            action("Greet")
                .default_action()
                .description("Say hello")
                .param(param("name").required(true).description("Who to greet"))
                .param(param("times").value_type("integer").default_value("1"))
                .param(param("shout").switch()),
        )
        .action(action("Version").alias("ver").description("Print the version"))
        .subcommand(
            command("remote")
                .description("Manage remotes")
                .convention(HYPHEN_CASE)
                .action(
                    action("AddRemote")
                        .alias("add")
                        .param(param("remoteName").required(true))
                        .param(param("url").required(true))
                        .param(param("fetchNow").switch()),
                )
                .action(action("ListRemotes").default_action().alias("ls")),
        )
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn guess_project_name(project_dir: &Path) -> Option<String> {
    // For `.` or other non-meaningful paths, try the current directory name.
    let file_name = project_dir.file_name().and_then(|s| s.to_str());
    let direct = file_name.filter(|s| !s.is_empty() && *s != "." && *s != "..");
    if let Some(name) = direct {
        return Some(name.to_string());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("convoke-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sample_catalog_builds() {
        let catalog = Catalog::from_decl(&sample_catalog("demo")).unwrap();
        assert_eq!(catalog.root().default_action().map(|a| a.name()), Some("Greet"));
        assert!(catalog.find(&["remote"]).is_some());
    }

    #[test]
    fn write_default_manifest_round_trips() {
        let dir = make_temp_dir("manifest-defaults");
        let dest = write_default_manifest(&dir, false).unwrap();
        assert_eq!(dest.file_name().unwrap(), DEFAULT_CATALOG_NAME);

        let loaded = load_catalog(Some(dest.as_path())).unwrap();
        let project_name = dir.file_name().unwrap().to_string_lossy();
        assert_eq!(
            loaded.manifest.root.description,
            format!("{project_name} command catalog")
        );
        assert!(loaded.build().is_ok());

        // A second call keeps the existing file.
        fs::write(&dest, "{}").unwrap();
        write_default_manifest(&dir, false).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "{}");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_missing_catalog_is_an_error() {
        let dir = make_temp_dir("manifest-missing");
        let err = locate_catalog(Some(dir.join("nope.json").as_path())).unwrap_err();
        assert!(err.to_string().contains("catalog not found"));
        let _ = fs::remove_dir_all(&dir);
    }
}
