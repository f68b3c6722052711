//! `TypeRelationship` storage, feeding `trace_types` (§6.3) and the
//! type_affinity Markov chain (§4.8.3).

use super::SymbolDatabase;
use crate::error::Result;
use crate::model::{RelationshipKind, TypeRelationship};
use rusqlite::params;

impl SymbolDatabase {
    pub fn insert_type_relationship(&self, rel: &TypeRelationship) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO type_relationships (id, source_symbol_id, source_name, target_symbol_id, target_name, relationship_kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![rel.id, rel.source_symbol_id, rel.source_name, rel.target_symbol_id, rel.target_name, rel.relationship_kind.as_str()],
        )?;
        Ok(())
    }

    pub fn insert_type_relationships(&self, rels: &[TypeRelationship]) -> Result<()> {
        for rel in rels {
            self.insert_type_relationship(rel)?;
        }
        Ok(())
    }

    pub fn resolve_type_relationship_target(&self, id: &str, target_symbol_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE type_relationships SET target_symbol_id = ?1 WHERE id = ?2",
            params![target_symbol_id, id],
        )?;
        Ok(())
    }

    pub fn relationships_from(&self, source_symbol_id: &str) -> Result<Vec<TypeRelationship>> {
        self.select_type_relationships("WHERE source_symbol_id = ?1", params![source_symbol_id])
    }

    pub fn relationships_to(&self, target_symbol_id: &str) -> Result<Vec<TypeRelationship>> {
        self.select_type_relationships("WHERE target_symbol_id = ?1", params![target_symbol_id])
    }

    pub fn all_type_relationships(&self) -> Result<Vec<TypeRelationship>> {
        self.select_type_relationships("", [])
    }

    fn select_type_relationships(&self, where_clause: &str, params: impl rusqlite::Params) -> Result<Vec<TypeRelationship>> {
        let sql = format!(
            "SELECT id, source_symbol_id, source_name, target_symbol_id, target_name, relationship_kind
             FROM type_relationships {where_clause}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| {
            let kind: String = row.get(5)?;
            Ok(TypeRelationship {
                id: row.get(0)?,
                source_symbol_id: row.get(1)?,
                source_name: row.get(2)?,
                target_symbol_id: row.get(3)?,
                target_name: row.get(4)?,
                relationship_kind: RelationshipKind::parse(&kind).unwrap_or(RelationshipKind::Extends),
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
