use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    AnnotatedCommit, BranchType, Cred, CredentialType, ErrorCode, FetchOptions, Oid, PushOptions,
    RemoteCallbacks, Repository as Git2Repo, Sort,
};

use crate::error::{ReleaseError, Result};
use crate::git::MergeOutcome;

/// libgit2 keeps asking for credentials while they are rejected.
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| ReleaseError::invalid_input("repository has no working directory"))
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::invalid_input("HEAD is not a valid branch name"))
    }

    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self.workdir()?.canonicalize()?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let absolute = absolute.canonicalize()?;

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ReleaseError::invalid_input(format!(
                    "'{}' is outside the repository",
                    path.display()
                ))
            })
    }

    /// Finds a remote-tracking branch `<remote>/<branch>` on any configured remote.
    fn find_tracking_branch(&self, branch: &str) -> Result<Option<git2::Branch<'_>>> {
        let remotes = self.repo.remotes()?;
        for remote in remotes.iter().flatten() {
            let name = format!("{}/{}", remote, branch);
            match self.repo.find_branch(&name, BranchType::Remote) {
                Ok(found) => return Ok(Some(found)),
                Err(e) if e.code() == ErrorCode::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    fn merge_annotated(
        &self,
        label: &str,
        annotated: &AnnotatedCommit<'_>,
        message: &str,
    ) -> Result<MergeOutcome> {
        let (analysis, _) = self.repo.merge_analysis(&[annotated])?;

        if analysis.is_up_to_date() {
            return Ok(MergeOutcome::UpToDate);
        }

        if analysis.is_fast_forward() {
            let target = self.repo.find_commit(annotated.id())?;
            self.repo
                .checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))?;
            let mut head = self.repo.head()?;
            head.set_target(target.id(), &format!("merge {}: Fast-forward", label))?;
            return Ok(MergeOutcome::FastForward);
        }

        self.repo.merge(&[annotated], None, None)?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            let mut paths = Vec::new();
            for conflict in index.conflicts()? {
                let conflict = conflict?;
                if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                    paths.push(String::from_utf8_lossy(&entry.path).into_owned());
                }
            }
            return Err(ReleaseError::MergeConflict {
                reference: label.to_string(),
                paths,
            });
        }

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let ours = self.repo.head()?.peel_to_commit()?;
        let theirs = self.repo.find_commit(annotated.id())?;
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&ours, &theirs],
        )?;
        self.repo.cleanup_state()?;

        Ok(MergeOutcome::Merged(oid))
    }

    fn push_refspecs(&self, remote_name: &str, refspecs: &[String]) -> std::result::Result<(), git2::Error> {
        let mut remote = self.repo.find_remote(remote_name)?;

        let mut callbacks = remote_callbacks();
        // The transport succeeding does not mean the remote accepted every ref.
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "{} was rejected: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        remote.push(&specs, Some(&mut push_options))
    }
}

/// Credential callbacks shared by fetch and push.
///
/// Tries SSH keys from ~/.ssh/, then the SSH agent, then libgit2's defaults.
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("no usable credentials for remote"));
        }

        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = Path::new(&home).join(".ssh").join(key);
                if path.exists() {
                    if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                        return Ok(cred);
                    }
                }
            }

            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        Cred::default()
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn checkout(&self, branch: &str) -> Result<()> {
        let local = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(local) => local,
            Err(e) if e.code() == ErrorCode::NotFound => {
                let tracking = self.find_tracking_branch(branch)?.ok_or(e)?;
                let tracking_name = tracking
                    .name()?
                    .map(str::to_string)
                    .ok_or_else(|| ReleaseError::invalid_input("invalid branch name"))?;
                let commit = tracking.get().peel_to_commit()?;
                let mut created = self.repo.branch(branch, &commit, false)?;
                created.set_upstream(Some(tracking_name.as_str()))?;
                created
            }
            Err(e) => return Err(e.into()),
        };

        let reference = local.into_reference();
        let refname = reference
            .name()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::invalid_input("invalid branch name"))?;
        let tree = reference.peel_to_tree()?;

        self.repo
            .checkout_tree(tree.as_object(), Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&refname)?;

        Ok(())
    }

    fn create_branch_from_head(&self, branch: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let created = self.repo.branch(branch, &head, false)?;
        let refname = created
            .get()
            .name()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::invalid_input("invalid branch name"))?;
        self.repo.set_head(&refname)?;

        Ok(())
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        let cannot_delete =
            |e: git2::Error| ReleaseError::recoverable(format!("Local {} cannot be deleted: {}", branch, e.message()));

        let mut found = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(cannot_delete)?;
        found.delete().map_err(cannot_delete)?;

        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push_refspecs(remote, &[format!(":refs/heads/{}", branch)])
            .map_err(|e| {
                ReleaseError::recoverable(format!(
                    "Remote {} cannot be deleted: {}",
                    branch,
                    e.message()
                ))
            })
    }

    fn fetch_all(&self) -> Result<()> {
        let remotes = self.repo.remotes()?;

        for name in remotes.iter().flatten() {
            let mut remote = self.repo.find_remote(name)?;
            let mut fetch_options = FetchOptions::new();
            fetch_options.remote_callbacks(remote_callbacks());

            remote
                .fetch(&[] as &[&str], Some(&mut fetch_options), None)
                .map_err(|e| {
                    ReleaseError::remote(format!("Failed to fetch from '{}': {}", name, e))
                })?;
        }

        Ok(())
    }

    fn pull(&self, remote_name: &str, branch: &str) -> Result<MergeOutcome> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|_| {
            ReleaseError::remote(format!("Remote '{}' not found", remote_name))
        })?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks());

        let refspec = format!(
            "+refs/heads/{}:refs/remotes/{}/{}",
            branch, remote_name, branch
        );
        remote
            .fetch(&[refspec.as_str()], Some(&mut fetch_options), None)
            .map_err(|e| {
                ReleaseError::remote(format!(
                    "Failed to fetch '{}' from '{}': {}",
                    branch, remote_name, e
                ))
            })?;

        let tracking = self
            .repo
            .find_reference(&format!("refs/remotes/{}/{}", remote_name, branch))?;
        let annotated = self.repo.reference_to_annotated_commit(&tracking)?;
        let label = format!("{}/{}", remote_name, branch);
        let message = format!("Merge branch '{}' of {}", branch, remote_name);

        self.merge_annotated(&label, &annotated, &message)
    }

    fn merge(&self, reference: &str) -> Result<MergeOutcome> {
        let resolved = self.repo.resolve_reference_from_short_name(reference)?;
        let annotated = self.repo.reference_to_annotated_commit(&resolved)?;

        let target = self.current_branch()?;
        let message = if resolved.is_remote() {
            format!("Merge remote-tracking branch '{}' into {}", reference, target)
        } else {
            format!("Merge branch '{}' into {}", reference, target)
        };

        self.merge_annotated(reference, &annotated, &message)
    }

    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(&self.relative_to_workdir(path)?)?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        Ok(oid)
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ReleaseError::tag(format!("'{}': {}", name, e.message())))?;

        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push_refspecs(remote, &[format!("refs/heads/{}:refs/heads/{}", branch, branch)])
            .map_err(|e| {
                ReleaseError::remote(format!("Failed to push branch '{}': {}", branch, e))
            })
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();

        self.push_refspecs(remote, &refspecs).map_err(|e| {
            if e.class() == git2::ErrorClass::Net {
                ReleaseError::remote(format!("Network error during push: {}", e))
            } else {
                ReleaseError::remote(format!("Failed to push tags {:?}: {}", tag_names, e))
            }
        })
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn log_range(&self, from: &str, to: &str) -> Result<String> {
        let from_oid = self.repo.revparse_single(from)?.peel_to_commit()?.id();
        let to_oid = self.repo.revparse_single(to)?.peel_to_commit()?.id();

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(from_oid)?;
        revwalk.push(to_oid)?;
        match self.repo.merge_base(from_oid, to_oid) {
            Ok(base) => revwalk.hide(base)?,
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut log = String::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let author = commit.author();

            log.push_str(&format!("commit {}\n", commit.id()));
            log.push_str(&format!(
                "Author: {} <{}>\n\n",
                author.name().unwrap_or("unknown"),
                author.email().unwrap_or("")
            ));
            for line in commit.message().unwrap_or("").lines() {
                log.push_str(&format!("    {}\n", line));
            }
            log.push('\n');
        }

        Ok(log)
    }
}
