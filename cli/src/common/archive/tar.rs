//! # packrs tar Handlers (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! The tar family of [`ArchiveHandler`]s. One implementation,
//! [`TarArchive`], is registered four times with different compressions:
//!
//! | Handler | Compression | tar flag |
//! |---|---|---|
//! | `TgzArchive` | gzip | `z` |
//! | `TarBzipArchive` | bzip2 | `j` |
//! | `TarXzArchive` | xz | `J` |
//! | `TarArchive` | none | |
//!
//! ## Tool resolution
//!
//! GNU tar is required for `--diff` wording and for `--owner`/`--group`/`--mode`.
//! The handler looks for the host's preferred binary (`gtar` by default, which
//! is where GNU tar lives on BSD and macOS) and falls back to `tar`. Resolution
//! happens once, at construction.
//!
//! ## Lifecycle
//!
//! Built (constructed with its request) → Checked (`precheck`) → Packed
//! (`pack`, which consumes the handler). Both runs use the same working
//! directory, operand and policy flags, so the compare sees exactly the member
//! paths the create would write.
//!
//! When the compare finds nothing, `precheck` also lists the archive (`-t`)
//! and enumerates what a create would store (`-cv` into `/dev/null`). Names
//! missing from the archive are reported as untracked, which is how paths
//! added since the last pack are caught.
//!
use crate::common::archive::command::{ArchiveMode, TarCommand};
use crate::common::archive::diagnostics::{untracked_entries, DifferenceReport, MembershipCheck};
use crate::common::archive::policy::{Compression, PackRequest};
use crate::common::archive::ArchiveHandler;
use crate::common::process::{CommandInvocation, ExecutionResult};
use crate::common::system::Host;
use crate::core::error::PackError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const TGZ_HANDLER: &str = "TgzArchive";
pub const TBZ_HANDLER: &str = "TarBzipArchive";
pub const TXZ_HANDLER: &str = "TarXzArchive";
pub const TAR_HANDLER: &str = "TarArchive";

/// A tar handler for one compression, bound to one request.
#[derive(Debug)]
pub struct TarArchive {
    name: &'static str,
    compression: Compression,
    tool: Option<PathBuf>,
    request: PackRequest,
    elevated: bool,
    locale: String,
}

impl TarArchive {
    pub fn new(
        name: &'static str,
        compression: Compression,
        request: &PackRequest,
        host: &Host,
    ) -> Self {
        let (preferred, fallback) = host.tar_tools();
        let tool = host
            .resolve_tool(preferred)
            .or_else(|| host.resolve_tool(fallback));
        debug!("{} resolved tool: {:?}", name, tool);
        Self {
            name,
            compression,
            tool,
            request: request.clone(),
            elevated: host.is_elevated(),
            locale: host.locale().to_string(),
        }
    }

    pub fn gzip(request: &PackRequest, host: &Host) -> Box<dyn ArchiveHandler> {
        Box::new(Self::new(TGZ_HANDLER, Compression::Gzip, request, host))
    }

    pub fn bzip2(request: &PackRequest, host: &Host) -> Box<dyn ArchiveHandler> {
        Box::new(Self::new(TBZ_HANDLER, Compression::Bzip2, request, host))
    }

    pub fn xz(request: &PackRequest, host: &Host) -> Box<dyn ArchiveHandler> {
        Box::new(Self::new(TXZ_HANDLER, Compression::Xz, request, host))
    }

    pub fn plain(request: &PackRequest, host: &Host) -> Box<dyn ArchiveHandler> {
        Box::new(Self::new(TAR_HANDLER, Compression::None, request, host))
    }

    /// The invocation for `mode`, with the locale pinned.
    pub fn invocation(&self, mode: ArchiveMode) -> Result<CommandInvocation, PackError> {
        let tool = self.tool.as_deref().ok_or_else(|| PackError::NoHandler {
            path: self.request.source.display().to_string(),
        })?;
        let operand = self.request.operand();
        let command = TarCommand {
            tool,
            mode,
            compression: self.compression,
            policy: &self.request.policy,
            excludes: &self.request.excludes,
            extra_opts: &self.request.extra_opts,
            archive: &self.request.destination,
            operand: &operand,
            cwd: self.request.working_dir(),
        };
        Ok(command.build().with_locale(&self.locale))
    }

    /// Adds every name the create run would store but the archive lacks.
    fn check_membership(&self, report: &mut DifferenceReport) -> Result<(), PackError> {
        let listed = self.invocation(ArchiveMode::List)?.execute()?;
        if !listed.success() {
            warn!("Listing '{}' failed (rc {})", self.request.destination.display(), listed.rc);
            report.record_membership(MembershipCheck::Failed, Vec::new());
            return Ok(());
        }
        let planned = self.invocation(ArchiveMode::Enumerate)?.execute()?;
        if !planned.success() {
            warn!("Enumerating '{}' failed (rc {})", self.request.source.display(), planned.rc);
            report.record_membership(MembershipCheck::Failed, Vec::new());
            return Ok(());
        }

        let untracked = untracked_entries(listed.stdout.lines(), planned.stdout.lines());
        debug!("{} untracked path(s) under '{}'", untracked.len(), self.request.source.display());
        report.record_membership(MembershipCheck::Complete, untracked);
        Ok(())
    }
}

impl ArchiveHandler for TarArchive {
    fn name(&self) -> &'static str {
        self.name
    }

    fn tool(&self) -> Option<&Path> {
        self.tool.as_deref()
    }

    fn can_handle(&self) -> bool {
        self.tool.is_some() && self.request.formats().contains(&self.compression)
    }

    fn precheck(&self) -> Result<DifferenceReport, PackError> {
        let result = self.invocation(ArchiveMode::Compare)?.execute()?;
        let mut report = DifferenceReport::classify(result, self.elevated, &self.request.policy);
        if report.archived && report.is_conclusive() {
            self.check_membership(&mut report)?;
        }
        info!(
            "Precheck of '{}': archived={} (rc {})",
            self.request.destination.display(),
            report.archived,
            report.rc
        );
        Ok(report)
    }

    fn pack(self: Box<Self>) -> Result<ExecutionResult, PackError> {
        let result = self.invocation(ArchiveMode::Create)?.execute()?;
        info!(
            "Packed '{}' into '{}' (rc {})",
            self.request.source.display(),
            self.request.destination.display(),
            result.rc
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::diagnostics::DifferenceKind;
    use crate::common::archive::policy::{ExcludeList, ExtraOpts, OwnershipPolicy};
    use crate::common::archive::diagnostics::MembershipCheck;
    use crate::common::archive::test_support::recorded_args;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    fn request(options: &str) -> PackRequest {
        PackRequest {
            source: PathBuf::from("/data/project"),
            destination: PathBuf::from("/backup/project.tar.gz"),
            options: options.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_tool_means_cannot_handle() {
        let empty = tempdir().unwrap();
        let host = Host::new(Some(empty.path().as_os_str().to_owned()), false);
        let handler = TarArchive::new(TGZ_HANDLER, Compression::Gzip, &request("z"), &host);

        assert!(handler.tool().is_none());
        assert!(!handler.can_handle());
        assert!(matches!(
            handler.invocation(ArchiveMode::Create),
            Err(PackError::NoHandler { .. })
        ));
    }

    #[cfg(unix)]
    mod with_fake_tar {
        use super::*;
        use crate::common::archive::test_support::{fake_tar, FakeTar};

        #[test]
        fn test_prefers_gtar_over_tar() {
            let bin = tempdir().unwrap();
            let gtar = fake_tar(bin.path(), "gtar");
            fake_tar(bin.path(), "tar");
            let host = Host::new(Some(bin.path().as_os_str().to_owned()), false);

            let handler = TarArchive::new(TGZ_HANDLER, Compression::Gzip, &request("z"), &host);
            assert_eq!(handler.tool(), Some(gtar.as_path()));
        }

        #[test]
        fn test_falls_back_to_tar() {
            let bin = tempdir().unwrap();
            let tar = fake_tar(bin.path(), "tar");
            let host = Host::new(Some(bin.path().as_os_str().to_owned()), false);

            let handler = TarArchive::new(TGZ_HANDLER, Compression::Gzip, &request("z"), &host);
            assert_eq!(handler.tool(), Some(tar.as_path()));
            assert!(handler.can_handle());
        }

        #[test]
        fn test_can_handle_requires_matching_format() {
            let bin = tempdir().unwrap();
            fake_tar(bin.path(), "tar");
            let host = Host::new(Some(bin.path().as_os_str().to_owned()), false);

            let xz = TarArchive::new(TXZ_HANDLER, Compression::Xz, &request("gz"), &host);
            assert!(!xz.can_handle());
            let plain = TarArchive::new(TAR_HANDLER, Compression::None, &request("tar"), &host);
            assert!(plain.can_handle());
        }

        #[test]
        fn test_invocation_pins_locale_and_working_dir() {
            let bin = tempdir().unwrap();
            fake_tar(bin.path(), "tar");
            let host = Host::new(Some(bin.path().as_os_str().to_owned()), false).with_locale("POSIX");

            let handler = TarArchive::new(TGZ_HANDLER, Compression::Gzip, &request("z"), &host);
            let invocation = handler.invocation(ArchiveMode::Compare).unwrap();
            assert_eq!(invocation.env_override("LC_ALL"), Some(OsStr::new("POSIX")));
            assert_eq!(invocation.cwd(), Some(Path::new("/data")));
            assert_eq!(
                invocation.args_lossy(),
                vec!["-dz", "-f", "/backup/project.tar.gz", "project"]
            );
        }

        #[test]
        fn test_precheck_then_pack_runs_tool() {
            let work = tempdir().unwrap();
            let bin = work.path().join("bin");
            let source = work.path().join("project");
            std::fs::create_dir_all(&bin).unwrap();
            std::fs::create_dir_all(&source).unwrap();
            let tool = fake_tar(&bin, "tar");
            let destination = work.path().join("out.tgz");

            let request = PackRequest {
                source: source.clone(),
                destination: destination.clone(),
                options: "z".into(),
                policy: OwnershipPolicy::new(None, None, Some("0644".into())).unwrap(),
                excludes: ExcludeList::new(["cache/"]),
                extra_opts: ExtraOpts::new(["--numeric-owner"]),
                workdir: None,
            };
            let host = Host::new(Some(bin.as_os_str().to_owned()), false);
            let handler: Box<dyn ArchiveHandler> = TarArchive::gzip(&request, &host);

            let report = handler.precheck().unwrap();
            assert!(report.archived);
            assert_eq!(report.membership, MembershipCheck::Complete);
            assert!(!destination.exists());
            assert_eq!(
                recorded_args(&tool, "-tz").unwrap(),
                vec!["-tz".to_string(), "-f".to_string(), destination.display().to_string()]
            );
            assert_eq!(
                recorded_args(&tool, "-cv").unwrap(),
                vec!["-cv", "--exclude=cache", "-f", "/dev/null", "project"]
            );

            let result = handler.pack().unwrap();
            assert!(result.success());
            assert!(destination.is_file());

            let expected_tail = vec![
                "--numeric-owner".to_string(),
                "--mode=0644".to_string(),
                "--exclude=cache".to_string(),
                "-f".to_string(),
                destination.display().to_string(),
                "project".to_string(),
            ];
            let create = recorded_args(&tool, "-cz").unwrap();
            assert_eq!(create[0], "-cz");
            assert_eq!(create[1..], expected_tail[..]);
            let compare = recorded_args(&tool, "-dz").unwrap();
            assert_eq!(compare[0], "-dz");
            assert_eq!(compare[1..], expected_tail[..]);

            let env = std::fs::read_to_string(format!("{}.env", tool.display())).unwrap();
            assert_eq!(env, "C\nC\nC\nC\n");
        }

        #[test]
        fn test_precheck_reports_mod_time_difference() {
            let work = tempdir().unwrap();
            let source = work.path().join("project");
            std::fs::create_dir_all(&source).unwrap();
            let tool = work.path().join("tar");
            std::fs::write(
                &tool,
                "#!/bin/sh\necho 'project/a.txt: Mod time differs'\necho 'project/a.txt: Uid differs'\nexit 1\n",
            )
            .unwrap();
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
            }
            let request = PackRequest {
                source,
                destination: work.path().join("out.tgz"),
                options: "z".into(),
                ..Default::default()
            };
            let host = Host::new(Some(work.path().as_os_str().to_owned()), false);
            let handler = TarArchive::new(TGZ_HANDLER, Compression::Gzip, &request, &host);

            let report = handler.precheck().unwrap();
            assert!(!report.archived);
            assert_eq!(report.rc, 1);
            assert_eq!(report.differences.len(), 1);
            assert_eq!(report.differences[0].kind, DifferenceKind::ModTime);
            assert_eq!(report.membership, MembershipCheck::NotRun);
        }

        fn gzip_request(work: &Path) -> PackRequest {
            let source = work.join("project");
            std::fs::create_dir_all(&source).unwrap();
            PackRequest {
                source,
                destination: work.join("out.tgz"),
                options: "z".into(),
                ..Default::default()
            }
        }

        #[test]
        fn test_precheck_reports_paths_added_since_last_pack() {
            let work = tempdir().unwrap();
            let bin = work.path().join("bin");
            std::fs::create_dir_all(&bin).unwrap();
            FakeTar {
                listing: "project/\nproject/a.txt\n",
                planned: "project/\nproject/a.txt\nproject/new.txt\n",
                ..Default::default()
            }
            .install(&bin, "tar");
            let host = Host::new(Some(bin.into_os_string()), false);
            let handler = TarArchive::gzip(&gzip_request(work.path()), &host);

            let report = handler.precheck().unwrap();
            assert!(!report.archived);
            assert!(!report.confirms_up_to_date());
            assert_eq!(report.membership, MembershipCheck::Complete);
            assert_eq!(report.differences.len(), 1);
            assert_eq!(report.differences[0].kind, DifferenceKind::Untracked);
            assert_eq!(report.filtered, "project/new.txt: Not in archive\n");
        }

        #[test]
        fn test_failed_listing_cannot_confirm_archive() {
            let work = tempdir().unwrap();
            let bin = work.path().join("bin");
            std::fs::create_dir_all(&bin).unwrap();
            FakeTar {
                list_rc: 2,
                ..Default::default()
            }
            .install(&bin, "tar");
            let host = Host::new(Some(bin.into_os_string()), false);
            let handler = TarArchive::gzip(&gzip_request(work.path()), &host);

            let report = handler.precheck().unwrap();
            assert!(report.archived);
            assert_eq!(report.membership, MembershipCheck::Failed);
            assert!(!report.confirms_up_to_date());
        }
    }
}
