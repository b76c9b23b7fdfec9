// src/repositories/evolution_repository.rs
//
// Evolution edge persistence.

use std::sync::Arc;

use rusqlite::{params, Row};

use crate::db::ConnectionPool;
use crate::domain::EvolutionEdge;
use crate::error::AppResult;

pub trait EvolutionRepository: Send + Sync {
    /// Upsert one directed edge by its (from, to) composite key, replacing
    /// the details text on re-load.
    fn upsert_edge(&self, edge: &EvolutionEdge) -> AppResult<()>;
    fn edges_from(&self, from_pokemon_id: i64) -> AppResult<Vec<EvolutionEdge>>;
    fn count(&self) -> AppResult<i64>;
}

pub struct SqliteEvolutionRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteEvolutionRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_edge(row: &Row) -> Result<EvolutionEdge, rusqlite::Error> {
        Ok(EvolutionEdge {
            from_pokemon_id: row.get("from_pokemon_id")?,
            to_pokemon_id: row.get("to_pokemon_id")?,
            details: row.get("evolution_details")?,
        })
    }
}

impl EvolutionRepository for SqliteEvolutionRepository {
    fn upsert_edge(&self, edge: &EvolutionEdge) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO evolution (from_pokemon_id, to_pokemon_id, evolution_details)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(from_pokemon_id, to_pokemon_id) DO UPDATE SET
                 evolution_details = excluded.evolution_details",
            params![edge.from_pokemon_id, edge.to_pokemon_id, edge.details],
        )?;

        Ok(())
    }

    fn edges_from(&self, from_pokemon_id: i64) -> AppResult<Vec<EvolutionEdge>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT from_pokemon_id, to_pokemon_id, evolution_details
             FROM evolution
             WHERE from_pokemon_id = ?1
             ORDER BY to_pokemon_id",
        )?;

        let edges: Vec<EvolutionEdge> = stmt
            .query_map(params![from_pokemon_id], Self::row_to_edge)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(edges)
    }

    fn count(&self) -> AppResult<i64> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM evolution", [], |row| row.get(0))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::domain::{NormalizedPokemon, Pokemon};
    use crate::repositories::pokemon_repository::{PokemonRepository, SqlitePokemonRepository};

    fn bare_pokemon(id: i64, name: &str) -> NormalizedPokemon {
        NormalizedPokemon {
            pokemon: Pokemon {
                id,
                name: name.to_string(),
                height: None,
                weight: None,
                base_experience: None,
                species_url: None,
            },
            types: vec![],
            abilities: vec![],
            stats: vec![],
        }
    }

    #[test]
    fn test_upsert_edge_idempotent() {
        let (_dir, pool) = create_test_pool();
        let pokemon_repo = SqlitePokemonRepository::new(pool.clone());
        let repo = SqliteEvolutionRepository::new(pool);

        pokemon_repo.upsert(&bare_pokemon(1, "bulbasaur")).unwrap();
        pokemon_repo.upsert(&bare_pokemon(2, "ivysaur")).unwrap();

        let edge = EvolutionEdge {
            from_pokemon_id: 1,
            to_pokemon_id: 2,
            details: Some("trigger=level-up;min_level=16".to_string()),
        };
        repo.upsert_edge(&edge).unwrap();
        repo.upsert_edge(&edge).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.edges_from(1).unwrap(), vec![edge]);
    }

    #[test]
    fn test_reload_replaces_details() {
        let (_dir, pool) = create_test_pool();
        let pokemon_repo = SqlitePokemonRepository::new(pool.clone());
        let repo = SqliteEvolutionRepository::new(pool);

        pokemon_repo.upsert(&bare_pokemon(1, "bulbasaur")).unwrap();
        pokemon_repo.upsert(&bare_pokemon(2, "ivysaur")).unwrap();

        repo.upsert_edge(&EvolutionEdge {
            from_pokemon_id: 1,
            to_pokemon_id: 2,
            details: None,
        })
        .unwrap();
        repo.upsert_edge(&EvolutionEdge {
            from_pokemon_id: 1,
            to_pokemon_id: 2,
            details: Some("trigger=level-up;min_level=16".to_string()),
        })
        .unwrap();

        let edges = repo.edges_from(1).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].details.as_deref(),
            Some("trigger=level-up;min_level=16")
        );
    }

    #[test]
    fn test_edge_requires_existing_endpoints() {
        let (_dir, pool) = create_test_pool();
        let repo = SqliteEvolutionRepository::new(pool);

        let result = repo.upsert_edge(&EvolutionEdge {
            from_pokemon_id: 1,
            to_pokemon_id: 2,
            details: None,
        });

        assert!(result.is_err(), "edge without pokemon rows must be rejected");
    }
}
