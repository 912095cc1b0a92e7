// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use methodtrail::model::{CommitSnapshot, FileChange};

/// Declarations of varying shape, from trivial to annotation-heavy
pub const DECLARATIONS: &[&str] = &[
    "public int add(int a, int b)",
    "private static final String name()",
    "@Override\n    public boolean equals(Object other)",
    "public <T extends Comparable<T>> List<T> sort(final Collection<? extends T> items, Comparator<? super T> cmp)",
    "@SuppressWarnings(\"unchecked\") protected java.util.Map<String, List<Integer>>[] index(int[] keys, String... names)",
    "Widget(@NonNull String label, int width, int height)",
];

/// A Java class with `methods` methods whose bodies depend on `revision`
pub fn generate_class(name: &str, methods: usize, revision: usize) -> Vec<String> {
    let mut lines = vec![format!("public class {} {{", name)];
    for m in 0..methods {
        lines.push(format!("    public int method{}(int a, String b) {{", m));
        // Every third method changes with each revision
        let value = if m % 3 == 0 { revision } else { 0 };
        lines.push(format!("        int x = a + {};", value));
        lines.push("        return x + b.length();".to_string());
        lines.push("    }".to_string());
        lines.push(String::new());
    }
    lines.push("}".to_string());
    lines
}

/// A commit stream of `commits` commits over `files` classes
pub fn generate_history(commits: usize, files: usize, methods: usize) -> Vec<CommitSnapshot> {
    (0..commits)
        .map(|c| CommitSnapshot {
            oid: gix::ObjectId::null(gix::hash::Kind::Sha1),
            author: "Bench".into(),
            committer: "Bench".into(),
            committer_timestamp: 1_700_000_000 + c as i64 * 60,
            files: (0..files)
                .map(|f| {
                    let name = format!("Class{}", f);
                    FileChange::new(
                        format!("src/{}.java", name),
                        generate_class(&name, methods, c),
                    )
                })
                .collect(),
        })
        .collect()
}
