use std::{
    cmp::Ordering,
    collections::btree_map,
    iter::Peekable,
    path::Path,
};

use replica_core::types::{Action, EntryKind, RelativePath};

use crate::{
    compare::Comparator,
    error::ComparisonError,
    walker::{Entry, Snapshot},
};

/// Actions to apply on the replica, in application order, and the
/// comparisons which could not be made (their file is planned for update).
#[derive(Debug, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub comparison_errors: Vec<(RelativePath, ComparisonError)>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

type Entries<'a> = Peekable<btree_map::Iter<'a, RelativePath, Entry>>;

pub struct Planner<'a> {
    comparator: &'a Comparator,
}

impl<'a> Planner<'a> {
    pub fn new(comparator: &'a Comparator) -> Self {
        Self { comparator }
    }

    /// Merge both snapshots (ordered by path) in a single pass. Creations
    /// and updates come in snapshot order, so folders before their content.
    /// Removals come last, deepest first. Nothing is planned at or under a
    /// replica path which could not be read, its failure is already known.
    pub fn plan(&self, source: &Snapshot, replica: &Snapshot) -> Plan {
        let mut plan = Plan::default();
        let mut removals = vec![];
        let mut sources = source.entries().iter().peekable();
        let mut replicas: Entries = replica.entries().iter().peekable();

        loop {
            let order = match (sources.peek(), replicas.peek()) {
                (None, None) => break,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((source_path, _)), Some((replica_path, _))) => source_path.cmp(replica_path),
            };

            match order {
                Ordering::Less => {
                    if let Some((path, entry)) = sources.next() {
                        plan.actions.extend(create(path.clone(), entry.kind));
                    }
                }
                Ordering::Greater => {
                    if let Some((path, entry)) = replicas.next() {
                        if source.is_unreadable(path) {
                            log::debug!("Keep {} (unreadable in source)", path.display());
                        } else {
                            removals.push(Action::delete(path.clone(), entry.kind));
                        }
                    }
                }
                Ordering::Equal => {
                    if let (Some((path, source_entry)), Some((_, replica_entry))) =
                        (sources.next(), replicas.next())
                    {
                        self.matched(
                            &mut plan,
                            &mut replicas,
                            source,
                            replica,
                            path,
                            source_entry,
                            replica_entry,
                        );
                    }
                }
            }
        }

        plan.actions.extend(removals.into_iter().rev());
        plan.actions.retain(|action| {
            let unreadable = replica.is_unreadable(action.path());
            if unreadable {
                log::debug!("Skip {} (unreadable in replica)", action);
            }
            !unreadable
        });
        plan
    }

    #[allow(clippy::too_many_arguments)]
    fn matched(
        &self,
        plan: &mut Plan,
        replicas: &mut Entries,
        source: &Snapshot,
        replica: &Snapshot,
        path: &RelativePath,
        source_entry: &Entry,
        replica_entry: &Entry,
    ) {
        match (source_entry.kind, replica_entry.kind) {
            (EntryKind::Special, _) => {}
            (EntryKind::Directory, EntryKind::Directory) => {}
            (EntryKind::File, EntryKind::File) => {
                match self.comparator.differs(
                    &source.absolute(path),
                    source_entry,
                    &replica.absolute(path),
                    replica_entry,
                ) {
                    Ok(true) => plan.actions.push(Action::UpdateFile(path.clone())),
                    Ok(false) => {}
                    Err(error) => {
                        plan.actions.push(Action::UpdateFile(path.clone()));
                        plan.comparison_errors.push((path.clone(), error));
                    }
                }
            }
            // Not the same kind of entry: the replica one (and its content)
            // is removed before being created again.
            _ => {
                let mut replaced = vec![Action::delete(path.clone(), replica_entry.kind)];
                while let Some((child, child_entry)) =
                    replicas.next_if(|(child, _)| is_descendant(child, path))
                {
                    replaced.push(Action::delete(child.clone(), child_entry.kind));
                }
                plan.actions.extend(replaced.into_iter().rev());
                plan.actions.extend(create(path.clone(), source_entry.kind));
            }
        }
    }
}

// Special entries have no content to copy
fn create(path: RelativePath, kind: EntryKind) -> Option<Action> {
    match kind {
        EntryKind::Directory => Some(Action::CreateDir(path)),
        EntryKind::File | EntryKind::Symlink => Some(Action::CopyFile(path)),
        EntryKind::Special => None,
    }
}

fn is_descendant(child: &Path, parent: &Path) -> bool {
    child != parent && child.starts_with(parent)
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn snapshot(root: &str, raw_entries: &[(&str, EntryKind)]) -> Snapshot {
        let mut snapshot = Snapshot::new(PathBuf::from(root));
        for (raw_path, kind) in raw_entries {
            snapshot.insert(PathBuf::from(raw_path), Entry::new(*kind, 0, None));
        }
        snapshot
    }

    fn actions(raw: &[(&str, &str)]) -> Vec<Action> {
        raw.iter()
            .map(|(kind, path)| {
                let path = PathBuf::from(path);
                match *kind {
                    "CreateDir" => Action::CreateDir(path),
                    "CopyFile" => Action::CopyFile(path),
                    "UpdateFile" => Action::UpdateFile(path),
                    "DeleteFile" => Action::DeleteFile(path),
                    "DeleteDir" => Action::DeleteDir(path),
                    _ => unreachable!(),
                }
            })
            .collect()
    }

    use replica_core::types::EntryKind::{Directory as D, File as F, Special as S, Symlink as L};

    #[rstest]
    // Nothing
    #[case(vec![], vec![], vec![])]
    // Same folders
    #[case(vec![("sub", D)], vec![("sub", D)], vec![])]
    // New folder with content
    #[case(
        vec![("sub", D), ("sub/b.txt", F), ("sub/deep", D), ("sub/deep/c.txt", F)],
        vec![],
        vec![("CreateDir", "sub"), ("CopyFile", "sub/b.txt"), ("CreateDir", "sub/deep"), ("CopyFile", "sub/deep/c.txt")],
    )]
    // Removed folder with content, deepest first
    #[case(
        vec![],
        vec![("old", D), ("old/a.txt", F), ("old/deep", D), ("old/deep/b.txt", F), ("z.txt", F)],
        vec![("DeleteFile", "z.txt"), ("DeleteFile", "old/deep/b.txt"), ("DeleteDir", "old/deep"), ("DeleteFile", "old/a.txt"), ("DeleteDir", "old")],
    )]
    // Creations before removals
    #[case(
        vec![("b.txt", F)],
        vec![("a.txt", F)],
        vec![("CopyFile", "b.txt"), ("DeleteFile", "a.txt")],
    )]
    // A file replaced by a folder
    #[case(
        vec![("x", D), ("x/a.txt", F)],
        vec![("x", F)],
        vec![("DeleteFile", "x"), ("CreateDir", "x"), ("CopyFile", "x/a.txt")],
    )]
    // A folder replaced by a file
    #[case(
        vec![("x", F)],
        vec![("x", D), ("x/a", D), ("x/a/b.txt", F), ("x.txt", F)],
        vec![("DeleteFile", "x/a/b.txt"), ("DeleteDir", "x/a"), ("DeleteDir", "x"), ("CopyFile", "x"), ("DeleteFile", "x.txt")],
    )]
    // A replica symlink is never written through
    #[case(
        vec![("link", F), ("dir", D)],
        vec![("link", L), ("dir", L)],
        vec![("DeleteFile", "dir"), ("CreateDir", "dir"), ("DeleteFile", "link"), ("CopyFile", "link")],
    )]
    // A replica special file is removed or replaced, never read
    #[case(
        vec![("pipe", F)],
        vec![("pipe", S), ("socket", S)],
        vec![("DeleteFile", "pipe"), ("CopyFile", "pipe"), ("DeleteFile", "socket")],
    )]
    // A source special file is never copied
    #[case(vec![("pipe", S), ("a.txt", F)], vec![], vec![("CopyFile", "a.txt")])]
    fn test_plan(
        #[case] source: Vec<(&str, EntryKind)>,
        #[case] replica: Vec<(&str, EntryKind)>,
        #[case] expected: Vec<(&str, &str)>,
    ) {
        // Given
        let source = snapshot("/nowhere/source", &source);
        let replica = snapshot("/nowhere/replica", &replica);
        let comparator = Comparator::default();

        // When
        let plan = Planner::new(&comparator).plan(&source, &replica);

        // Then
        assert_eq!(plan.actions, actions(&expected));
        assert!(plan.comparison_errors.is_empty());
    }

    #[test]
    fn test_unreadable_source_folder_keep_replica_content() {
        // Given
        let mut source = snapshot("/nowhere/source", &[("locked", D)]);
        source.skip(PathBuf::from("locked"), "Permission denied".to_string());
        let replica = snapshot(
            "/nowhere/replica",
            &[("locked", D), ("locked/a.txt", F), ("other.txt", F)],
        );
        let comparator = Comparator::default();

        // When
        let plan = Planner::new(&comparator).plan(&source, &replica);

        // Then
        assert_eq!(plan.actions, actions(&[("DeleteFile", "other.txt")]));
    }

    #[test]
    fn test_unreadable_replica_folder_is_left_alone() {
        // Given
        let source = snapshot("/nowhere/source", &[("locked", D), ("locked/new.txt", F)]);
        let mut replica = snapshot("/nowhere/replica", &[("locked", D), ("gone", D)]);
        replica.skip(PathBuf::from("locked"), "Permission denied".to_string());
        replica.skip(PathBuf::from("gone"), "Permission denied".to_string());
        let comparator = Comparator::default();

        // When
        let plan = Planner::new(&comparator).plan(&source, &replica);

        // Then
        assert_eq!(plan.actions, vec![]);
    }

    #[test]
    fn test_comparison_error_plan_update() {
        // Given
        let mut source = snapshot("/nowhere/source", &[]);
        source.insert(PathBuf::from("a.txt"), Entry::new(F, 3, None));
        let mut replica = snapshot("/nowhere/replica", &[]);
        replica.insert(PathBuf::from("a.txt"), Entry::new(F, 3, None));
        let comparator = Comparator::default();

        // When
        let plan = Planner::new(&comparator).plan(&source, &replica);

        // Then
        assert_eq!(plan.actions, actions(&[("UpdateFile", "a.txt")]));
        assert_eq!(plan.comparison_errors.len(), 1);
        assert_eq!(plan.comparison_errors[0].0, PathBuf::from("a.txt"));
    }
}
