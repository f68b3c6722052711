//! Stable ID generation (§3 "ID rule", invariant 4 in §8).
//!
//! `id = hash(filePath, symbolQualifiedName, kind, startLine)`. The teacher's
//! `AbstractExtractor::create_symbol_id` (an old revision of
//! `extractors/base.rs`) hashed the same kind of tuple with `DefaultHasher`;
//! we use `blake3` instead since IDs here are persisted to disk rather than
//! kept only in an in-memory map, and `DefaultHasher`'s output is not part of
//! Rust's stability guarantees across toolchain versions.

use crate::model::SymbolKind;

pub fn symbol_id(file_path: &str, qualified_name: &str, kind: SymbolKind, start_line: u32) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(file_path.as_bytes());
    hasher.update(b"\0");
    hasher.update(qualified_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(&start_line.to_le_bytes());
    hasher.finalize().to_hex()[..24].to_string()
}

pub fn reference_id(referencing_file: &str, symbol_name: &str, line: u32, column: u32) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(referencing_file.as_bytes());
    hasher.update(b"\0");
    hasher.update(symbol_name.as_bytes());
    hasher.update(&line.to_le_bytes());
    hasher.update(&column.to_le_bytes());
    hasher.finalize().to_hex()[..24].to_string()
}

pub fn call_edge_id(caller_symbol_id: &str, callee_name: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(caller_symbol_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(callee_name.as_bytes());
    hasher.finalize().to_hex()[..24].to_string()
}

pub fn type_relationship_id(source_symbol_id: &str, target_name: &str, kind: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(source_symbol_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(target_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(kind.as_bytes());
    hasher.finalize().to_hex()[..24].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_id_is_deterministic() {
        let a = symbol_id("src/lib.rs", "foo", SymbolKind::Function, 10);
        let b = symbol_id("src/lib.rs", "foo", SymbolKind::Function, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn symbol_id_changes_with_line() {
        let a = symbol_id("src/lib.rs", "foo", SymbolKind::Function, 10);
        let b = symbol_id("src/lib.rs", "foo", SymbolKind::Function, 11);
        assert_ne!(a, b);
    }
}
