// src/repositories/pokemon_repository.rs
//
// Pokemon persistence: the transactional upsert of one normalized record.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::db::ConnectionPool;
use crate::domain::{LookupKind, NormalizedPokemon, Pokemon};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
pub trait PokemonRepository: Send + Sync {
    /// Persist one normalized record as a single atomic unit: the pokemon
    /// row, its lookup names, and its association rows all commit together
    /// or not at all.
    fn upsert(&self, record: &NormalizedPokemon) -> AppResult<()>;
    fn get_by_id(&self, id: i64) -> AppResult<Option<Pokemon>>;
    fn id_by_name(&self, name: &str) -> AppResult<Option<i64>>;
    fn count(&self) -> AppResult<i64>;
}

pub struct SqlitePokemonRepository {
    pool: Arc<ConnectionPool>,
}

impl SqlitePokemonRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_pokemon(row: &Row) -> Result<Pokemon, rusqlite::Error> {
        Ok(Pokemon {
            id: row.get("id")?,
            name: row.get("name")?,
            height: row.get("height")?,
            weight: row.get("weight")?,
            base_experience: row.get("base_experience")?,
            species_url: row.get("species_url")?,
        })
    }

    /// Resolve a lookup name to its surrogate id, inserting it on first use.
    ///
    /// Deliberately an explicit two-step (SELECT by name, INSERT if absent)
    /// rather than an ON CONFLICT clause: the enclosing transaction plus the
    /// single-writer model makes the pair atomic, and the UNIQUE constraint
    /// on `name` is the backstop. A name maps to exactly one id for the
    /// lifetime of the store.
    fn lookup_or_create(tx: &Transaction, kind: LookupKind, name: &str) -> AppResult<i64> {
        let existing: Option<i64> = tx
            .query_row(
                &format!("SELECT id FROM {} WHERE name = ?1", kind.table()),
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        tx.execute(
            &format!("INSERT INTO {} (name) VALUES (?1)", kind.table()),
            params![name],
        )?;
        Ok(tx.last_insert_rowid())
    }

    fn upsert_in_tx(tx: &Transaction, record: &NormalizedPokemon) -> AppResult<()> {
        let pokemon = &record.pokemon;

        // Upsert by primary identifier: the id never changes, the mutable
        // attributes are overwritten. ON CONFLICT DO UPDATE instead of
        // INSERT OR REPLACE so the row is never deleted out from under the
        // association foreign keys.
        tx.execute(
            "INSERT INTO pokemon (id, name, height, weight, base_experience, species_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 height = excluded.height,
                 weight = excluded.weight,
                 base_experience = excluded.base_experience,
                 species_url = excluded.species_url",
            params![
                pokemon.id,
                pokemon.name,
                pokemon.height,
                pokemon.weight,
                pokemon.base_experience,
                pokemon.species_url,
            ],
        )?;

        for entry in &record.types {
            let type_id = Self::lookup_or_create(tx, LookupKind::Type, &entry.name)?;
            tx.execute(
                "INSERT INTO pokemon_type (pokemon_id, type_id, slot)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(pokemon_id, type_id) DO UPDATE SET slot = excluded.slot",
                params![pokemon.id, type_id, entry.slot],
            )?;
        }

        for entry in &record.abilities {
            let ability_id = Self::lookup_or_create(tx, LookupKind::Ability, &entry.name)?;
            tx.execute(
                "INSERT INTO pokemon_ability (pokemon_id, ability_id, is_hidden, slot)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(pokemon_id, ability_id) DO UPDATE SET
                     is_hidden = excluded.is_hidden,
                     slot = excluded.slot",
                params![pokemon.id, ability_id, entry.is_hidden, entry.slot],
            )?;
        }

        for entry in &record.stats {
            let stat_id = Self::lookup_or_create(tx, LookupKind::Stat, &entry.name)?;
            tx.execute(
                "INSERT INTO pokemon_stat (pokemon_id, stat_id, base_stat, effort)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(pokemon_id, stat_id) DO UPDATE SET
                     base_stat = excluded.base_stat,
                     effort = excluded.effort",
                params![pokemon.id, stat_id, entry.base_stat, entry.effort],
            )?;
        }

        Ok(())
    }
}

impl PokemonRepository for SqlitePokemonRepository {
    fn upsert(&self, record: &NormalizedPokemon) -> AppResult<()> {
        let mut conn = self.pool.get()?;

        // The transaction rolls back on drop unless committed, so every
        // error path below leaves the store untouched for this record.
        let tx = conn.transaction()?;
        Self::upsert_in_tx(&tx, record)?;
        tx.commit()?;

        Ok(())
    }

    fn get_by_id(&self, id: i64) -> AppResult<Option<Pokemon>> {
        let conn = self.pool.get()?;

        let pokemon = conn
            .query_row(
                "SELECT id, name, height, weight, base_experience, species_url
                 FROM pokemon WHERE id = ?1",
                params![id],
                Self::row_to_pokemon,
            )
            .optional()?;

        Ok(pokemon)
    }

    fn id_by_name(&self, name: &str) -> AppResult<Option<i64>> {
        let conn = self.pool.get()?;

        let id = conn
            .query_row(
                "SELECT id FROM pokemon WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn count(&self) -> AppResult<i64> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pokemon", [], |row| row.get(0))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::domain::{AbilitySlot, StatValue, TypeSlot};

    fn bulbasaur() -> NormalizedPokemon {
        NormalizedPokemon {
            pokemon: Pokemon {
                id: 1,
                name: "bulbasaur".to_string(),
                height: Some(7),
                weight: Some(69),
                base_experience: Some(64),
                species_url: Some("https://pokeapi.co/api/v2/pokemon-species/1/".to_string()),
            },
            types: vec![
                TypeSlot {
                    name: "grass".to_string(),
                    slot: Some(1),
                },
                TypeSlot {
                    name: "poison".to_string(),
                    slot: Some(2),
                },
            ],
            abilities: vec![AbilitySlot {
                name: "overgrow".to_string(),
                slot: Some(1),
                is_hidden: false,
            }],
            stats: vec![
                StatValue {
                    name: "hp".to_string(),
                    base_stat: Some(45),
                    effort: Some(0),
                },
                StatValue {
                    name: "attack".to_string(),
                    base_stat: Some(49),
                    effort: Some(1),
                },
            ],
        }
    }

    fn ivysaur() -> NormalizedPokemon {
        NormalizedPokemon {
            pokemon: Pokemon {
                id: 2,
                name: "ivysaur".to_string(),
                height: Some(10),
                weight: Some(130),
                base_experience: Some(142),
                species_url: None,
            },
            types: vec![
                TypeSlot {
                    name: "grass".to_string(),
                    slot: Some(1),
                },
                TypeSlot {
                    name: "poison".to_string(),
                    slot: Some(2),
                },
            ],
            abilities: vec![],
            stats: vec![],
        }
    }

    fn table_count(pool: &ConnectionPool, table: &str) -> i64 {
        let conn = pool.get().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_upsert_creates_all_row_sets() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();

        assert_eq!(table_count(&pool, "pokemon"), 1);
        assert_eq!(table_count(&pool, "type"), 2);
        assert_eq!(table_count(&pool, "pokemon_type"), 2);
        assert_eq!(table_count(&pool, "ability"), 1);
        assert_eq!(table_count(&pool, "pokemon_ability"), 1);
        assert_eq!(table_count(&pool, "stat"), 2);
        assert_eq!(table_count(&pool, "pokemon_stat"), 2);
    }

    #[test]
    fn test_slots_stored_verbatim() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();

        let conn = pool.get().unwrap();
        let grass_slot: i64 = conn
            .query_row(
                "SELECT pt.slot FROM pokemon_type pt
                 JOIN type t ON t.id = pt.type_id
                 WHERE pt.pokemon_id = 1 AND t.name = 'grass'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let poison_slot: i64 = conn
            .query_row(
                "SELECT pt.slot FROM pokemon_type pt
                 JOIN type t ON t.id = pt.type_id
                 WHERE pt.pokemon_id = 1 AND t.name = 'poison'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(grass_slot, 1);
        assert_eq!(poison_slot, 2);
    }

    #[test]
    fn test_reload_is_idempotent() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();
        repo.upsert(&bulbasaur()).unwrap();

        assert_eq!(table_count(&pool, "pokemon"), 1);
        assert_eq!(table_count(&pool, "type"), 2);
        assert_eq!(table_count(&pool, "pokemon_type"), 2);
        assert_eq!(table_count(&pool, "ability"), 1);
        assert_eq!(table_count(&pool, "pokemon_ability"), 1);
        assert_eq!(table_count(&pool, "stat"), 2);
        assert_eq!(table_count(&pool, "pokemon_stat"), 2);
    }

    #[test]
    fn test_shared_lookup_names_reuse_rows() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();
        repo.upsert(&ivysaur()).unwrap();

        // Both reference grass and poison: still exactly 2 type rows.
        assert_eq!(table_count(&pool, "type"), 2);
        assert_eq!(table_count(&pool, "pokemon_type"), 4);

        // And both association sets point at the same surrogate ids.
        let conn = pool.get().unwrap();
        let distinct_grass_ids: i64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT type_id) FROM pokemon_type pt
                 JOIN type t ON t.id = pt.type_id WHERE t.name = 'grass'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(distinct_grass_ids, 1);
    }

    #[test]
    fn test_lookup_id_stable_across_reloads() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();
        let conn = pool.get().unwrap();
        let first: i64 = conn
            .query_row("SELECT id FROM type WHERE name = 'grass'", [], |row| {
                row.get(0)
            })
            .unwrap();
        drop(conn);

        repo.upsert(&bulbasaur()).unwrap();
        let conn = pool.get().unwrap();
        let second: i64 = conn
            .query_row("SELECT id FROM type WHERE name = 'grass'", [], |row| {
                row.get(0)
            })
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_upsert_overwrites_mutable_attributes() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();

        let mut refetched = bulbasaur();
        refetched.pokemon.weight = Some(70);
        refetched.pokemon.base_experience = Some(65);
        repo.upsert(&refetched).unwrap();

        let stored = repo.get_by_id(1).unwrap().unwrap();
        assert_eq!(stored.weight, Some(70));
        assert_eq!(stored.base_experience, Some(65));
        assert_eq!(stored.name, "bulbasaur");
        assert_eq!(table_count(&pool, "pokemon"), 1);
    }

    #[test]
    fn test_edge_attributes_overwritten_on_reload() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();

        let mut refetched = bulbasaur();
        refetched.stats[0].base_stat = Some(50);
        repo.upsert(&refetched).unwrap();

        let conn = pool.get().unwrap();
        let hp: i64 = conn
            .query_row(
                "SELECT ps.base_stat FROM pokemon_stat ps
                 JOIN stat s ON s.id = ps.stat_id
                 WHERE ps.pokemon_id = 1 AND s.name = 'hp'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(hp, 50);
        assert_eq!(table_count(&pool, "pokemon_stat"), 2);
    }

    #[test]
    fn test_failed_upsert_rolls_back_whole_record() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        // Sabotage the last step of the record so the transaction fails
        // after the pokemon, type and association rows were written.
        {
            let conn = pool.get().unwrap();
            conn.execute_batch("DROP TABLE pokemon_stat;").unwrap();
        }

        let result = repo.upsert(&bulbasaur());
        assert!(result.is_err());

        // All rows for the record succeed or none do.
        assert_eq!(table_count(&pool, "pokemon"), 0);
        assert_eq!(table_count(&pool, "type"), 0);
        assert_eq!(table_count(&pool, "pokemon_type"), 0);
        assert_eq!(table_count(&pool, "ability"), 0);
        assert_eq!(table_count(&pool, "pokemon_ability"), 0);
        assert_eq!(table_count(&pool, "stat"), 0);
    }

    #[test]
    fn test_empty_collections_yield_no_association_rows() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        let record = NormalizedPokemon {
            pokemon: Pokemon {
                id: 132,
                name: "ditto".to_string(),
                height: None,
                weight: None,
                base_experience: None,
                species_url: None,
            },
            types: vec![],
            abilities: vec![],
            stats: vec![],
        };
        repo.upsert(&record).unwrap();

        assert_eq!(table_count(&pool, "pokemon"), 1);
        assert_eq!(table_count(&pool, "pokemon_type"), 0);
        assert_eq!(table_count(&pool, "pokemon_ability"), 0);
        assert_eq!(table_count(&pool, "pokemon_stat"), 0);
    }

    #[test]
    fn test_association_rows_reference_existing_rows() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool.clone());

        repo.upsert(&bulbasaur()).unwrap();
        repo.upsert(&ivysaur()).unwrap();

        let conn = pool.get().unwrap();
        let orphans: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pokemon_type pt
                 WHERE NOT EXISTS (SELECT 1 FROM pokemon p WHERE p.id = pt.pokemon_id)
                    OR NOT EXISTS (SELECT 1 FROM type t WHERE t.id = pt.type_id)",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_id_by_name() {
        let (_dir, pool) = create_test_pool();
        let repo = SqlitePokemonRepository::new(pool);

        repo.upsert(&bulbasaur()).unwrap();

        assert_eq!(repo.id_by_name("bulbasaur").unwrap(), Some(1));
        assert_eq!(repo.id_by_name("mewtwo").unwrap(), None);
    }
}
