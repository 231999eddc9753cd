use sha2::{Digest, Sha256};

/// Content-addressed identity of a task: SHA-256 of the verbatim comment
/// text, lowercase hex. Two tasks are the same task instance across saves
/// iff their fingerprints match.
pub fn fingerprint(comment: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(comment.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = fingerprint("/* [RED] trello task X, checklist items\n1.a\n*/");
        let b = fingerprint("/* [RED] trello task X, checklist items\n1.a\n*/");
        assert_eq!(a, b);
    }

    #[test]
    fn changes_with_content() {
        let a = fingerprint("/* [RED] trello task X, checklist items\n1.a\n*/");
        let b = fingerprint("/* [RED] trello task X, checklist items\n1.b\n*/");
        assert_ne!(a, b);
    }

    #[test]
    fn sensitive_to_whitespace() {
        // Surrounding whitespace is part of the matched comment and therefore
        // part of the identity.
        assert_ne!(fingerprint("x"), fingerprint("x "));
    }

    #[test]
    fn hex_encoded_sha256() {
        let fp = fingerprint("");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
