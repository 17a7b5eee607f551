//! Distribution template materialization.
//!
//! A fixture ships `*.dist` templates holding `##DATABASE_*##` placeholders.
//! Each one is rendered with the build options and written next to it under
//! its target name.

use crate::error::PrepareError;
use crate::ports::WritePort;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fixprep_types::fixture::DISTRIBUTION_FILES;
use fixprep_types::options::BuildOptions;
use fs_err as fs;
use tracing::{debug, warn};

pub const VENDOR_PLACEHOLDER: &str = "##DATABASE_VENDOR##";
pub const URL_PLACEHOLDER: &str = "##DATABASE_URL##";
pub const USER_PLACEHOLDER: &str = "##DATABASE_USER##";
pub const PASSWORD_PLACEHOLDER: &str = "##DATABASE_PASSWORD##";

/// Placeholder/value pairs for `options`.
pub fn substitutions(options: &BuildOptions) -> [(&'static str, &str); 4] {
    [
        (VENDOR_PLACEHOLDER, options.vendor.as_str()),
        (URL_PLACEHOLDER, options.dsn.as_str()),
        (USER_PLACEHOLDER, options.user.as_str()),
        (PASSWORD_PLACEHOLDER, options.password.as_str()),
    ]
}

/// Replace every placeholder occurrence in a single left-to-right pass.
///
/// Works on raw bytes, so templates need not be UTF-8. Inserted values are
/// never rescanned, so the result does not depend on the order of `pairs`.
pub fn render(template: &[u8], pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(template.len());
    let mut rest = template;
    while let Some(idx) = rest.windows(2).position(|w| w == b"##") {
        out.extend_from_slice(&rest[..idx]);
        let tail = &rest[idx..];
        match pairs
            .iter()
            .find(|(placeholder, _)| tail.starts_with(placeholder.as_bytes()))
        {
            Some((placeholder, value)) => {
                out.extend_from_slice(value.as_bytes());
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push(b'#');
                rest = &tail[1..];
            }
        }
    }
    out.extend_from_slice(rest);
    out
}

fn staging_path(target: &Utf8Path) -> Utf8PathBuf {
    let mut staged = target.as_str().to_owned();
    staged.push_str(".fixprep-tmp");
    Utf8PathBuf::from(staged)
}

/// Render every distribution template in `dir` and write the targets.
///
/// All templates must be present before anything is written; a missing one
/// yields [`PrepareError::TemplateMissing`] and leaves the directory untouched.
/// Rendered files are staged next to their targets and only renamed into
/// place once every one of them was written, so a failed write leaves the
/// existing targets as they were.
pub fn materialize_distribution_files(
    dir: &Utf8Path,
    options: &BuildOptions,
    writer: &dyn WritePort,
) -> Result<Vec<Utf8PathBuf>, PrepareError> {
    if let Some(rule) = DISTRIBUTION_FILES
        .iter()
        .find(|rule| !dir.join(rule.source).is_file())
    {
        return Err(PrepareError::TemplateMissing {
            directory: dir.to_path_buf(),
            template: rule.source.to_string(),
        });
    }

    let pairs = substitutions(options);
    let mut rendered = Vec::with_capacity(DISTRIBUTION_FILES.len());
    for rule in &DISTRIBUTION_FILES {
        let source = dir.join(rule.source);
        let content = fs::read(&source).with_context(|| format!("read template {}", source))?;
        rendered.push((dir.join(rule.target), render(&content, &pairs)));
    }

    let mut staged: Vec<(Utf8PathBuf, Utf8PathBuf)> = Vec::with_capacity(rendered.len());
    for (target, content) in rendered {
        let tmp = staging_path(&target);
        if let Err(err) = writer.write_file(&tmp, &content) {
            for (tmp, _) in &staged {
                if let Err(cleanup) = writer.remove_file(tmp) {
                    warn!(path = %tmp, "could not remove staged file: {:#}", cleanup);
                }
            }
            return Err(err.into());
        }
        staged.push((tmp, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, target) in staged {
        writer.rename(&tmp, &target)?;
        debug!(target = %target, "materialized distribution file");
        written.push(target);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FsWritePort;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "propel.database = ##DATABASE_VENDOR##\n\
        propel.database.url = ##DATABASE_URL##\n\
        propel.database.user = ##DATABASE_USER##\n\
        propel.database.password = ##DATABASE_PASSWORD##\n";

    fn options() -> BuildOptions {
        BuildOptions {
            vendor: "pgsql".to_string(),
            dsn: "pgsql:host=db;dbname=fixtures".to_string(),
            user: "tester".to_string(),
            password: "s3cret".to_string(),
            verbose: false,
        }
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    #[test]
    fn render_replaces_all_placeholders() {
        let opts = options();
        let out = render(SAMPLE.as_bytes(), &substitutions(&opts));
        let out = String::from_utf8(out).expect("utf8");
        assert!(!out.contains("##DATABASE_"));
        assert!(out.contains("propel.database = pgsql\n"));
        assert!(out.contains("propel.database.url = pgsql:host=db;dbname=fixtures\n"));
        assert!(out.contains("propel.database.password = s3cret\n"));
    }

    #[test]
    fn render_replaces_repeated_placeholders() {
        let opts = options();
        let out = render(b"##DATABASE_USER##/##DATABASE_USER##", &substitutions(&opts));
        assert_eq!(out, b"tester/tester");
    }

    #[test]
    fn render_keeps_unknown_markers_and_stray_hashes() {
        let opts = options();
        let out = render(b"# ##OTHER## ###DATABASE_USER## ##", &substitutions(&opts));
        assert_eq!(out, b"# ##OTHER## #tester ##");
    }

    #[test]
    fn render_passes_non_utf8_bytes_through() {
        let opts = options();
        let out = render(
            b"# Fran\xe7ais\npropel.database = ##DATABASE_VENDOR##\xff\n",
            &substitutions(&opts),
        );
        assert_eq!(out, b"# Fran\xe7ais\npropel.database = pgsql\xff\n");
    }

    #[test]
    fn render_with_empty_password() {
        let opts = BuildOptions::default();
        let out = render(b"password=##DATABASE_PASSWORD##;", &substitutions(&opts));
        assert_eq!(out, b"password=;");
    }

    #[test]
    fn render_does_not_rescan_inserted_values() {
        let opts = BuildOptions {
            vendor: "##DATABASE_USER##".to_string(),
            ..Default::default()
        };
        let out = render(b"##DATABASE_VENDOR##", &substitutions(&opts));
        assert_eq!(out, b"##DATABASE_USER##");
    }

    proptest! {
        #[test]
        fn render_is_order_independent(
            order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
            vendor in "[a-z#]{0,12}",
            user in "[A-Za-z#_]{0,12}",
            prefix in "[ -~]{0,16}",
        ) {
            let opts = BuildOptions {
                vendor,
                user,
                ..options()
            };
            let pairs = substitutions(&opts);
            let permuted: Vec<(&str, &str)> = order.iter().map(|&i| pairs[i]).collect();
            let template = format!("{}{}", prefix, SAMPLE);
            prop_assert_eq!(
                render(template.as_bytes(), &pairs),
                render(template.as_bytes(), &permuted)
            );
        }
    }

    #[test]
    fn materialize_writes_both_targets() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("build.properties.dist"), SAMPLE).expect("write");
        std::fs::write(
            root.join("runtime-conf.xml.dist"),
            "<dsn>##DATABASE_URL##</dsn>",
        )
        .expect("write");

        let written =
            materialize_distribution_files(&root, &options(), &FsWritePort).expect("materialize");
        assert_eq!(written.len(), 2);

        let conf = std::fs::read_to_string(root.join("runtime-conf.xml")).expect("read");
        assert_eq!(conf, "<dsn>pgsql:host=db;dbname=fixtures</dsn>");
        let props = std::fs::read_to_string(root.join("build.properties")).expect("read");
        assert!(props.contains("propel.database.user = tester"));
    }

    #[test]
    fn materialize_writes_nothing_when_a_template_is_missing() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("build.properties.dist"), SAMPLE).expect("write");

        let err = materialize_distribution_files(&root, &options(), &FsWritePort)
            .expect_err("missing runtime-conf.xml.dist");
        match err {
            PrepareError::TemplateMissing { template, .. } => {
                assert_eq!(template, "runtime-conf.xml.dist")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!root.join("build.properties").exists());
        assert!(!root.join("runtime-conf.xml").exists());
    }

    #[test]
    fn materialize_overwrites_existing_targets() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("build.properties.dist"), "v=##DATABASE_VENDOR##").expect("write");
        std::fs::write(root.join("runtime-conf.xml.dist"), "x").expect("write");
        std::fs::write(root.join("build.properties"), "stale").expect("write");

        materialize_distribution_files(&root, &options(), &FsWritePort).expect("materialize");
        let props = std::fs::read_to_string(root.join("build.properties")).expect("read");
        assert_eq!(props, "v=pgsql");
    }

    #[test]
    fn materialize_accepts_latin1_templates() {
        let (_temp, root) = temp_root();
        std::fs::write(
            root.join("build.properties.dist"),
            b"# Fran\xe7ais\npropel.database = ##DATABASE_VENDOR##\n",
        )
        .expect("write");
        std::fs::write(root.join("runtime-conf.xml.dist"), "x").expect("write");

        materialize_distribution_files(&root, &options(), &FsWritePort).expect("materialize");
        let props = std::fs::read(root.join("build.properties")).expect("read");
        assert_eq!(props, b"# Fran\xe7ais\npropel.database = pgsql\n");
    }

    /// Writes through to disk but refuses paths under a given file name.
    struct RefusingWriter {
        refuse: &'static str,
    }

    impl WritePort for RefusingWriter {
        fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
            if path.as_str().contains(self.refuse) {
                anyhow::bail!("disk full writing {}", path);
            }
            FsWritePort.write_file(path, contents)
        }

        fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
            FsWritePort.rename(from, to)
        }

        fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()> {
            FsWritePort.remove_file(path)
        }
    }

    #[test]
    fn failed_write_leaves_both_targets_untouched() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("build.properties.dist"), SAMPLE).expect("write");
        std::fs::write(root.join("runtime-conf.xml.dist"), "##DATABASE_URL##").expect("write");
        std::fs::write(root.join("build.properties"), "stale").expect("write");

        let writer = RefusingWriter {
            refuse: "runtime-conf.xml",
        };
        let err = materialize_distribution_files(&root, &options(), &writer)
            .expect_err("second write fails");
        assert!(err.to_string().contains("disk full"));

        let props = std::fs::read_to_string(root.join("build.properties")).expect("read");
        assert_eq!(props, "stale");
        assert!(!root.join("runtime-conf.xml").exists());
        let leftovers: Vec<_> = std::fs::read_dir(&root)
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".fixprep-tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
