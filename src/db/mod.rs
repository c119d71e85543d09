mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::error::{Error, Result};
use crate::models::*;

/// Handle to the hero store.
///
/// Clones share one connection. Every write runs in its own transaction, so
/// a failed validation or a cascade delete is never observed half-applied.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Hero operations
    // ============================================================

    pub fn get_all_heroes(&self) -> Result<Vec<Hero>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, super_name FROM heroes ORDER BY id")?;
        let heroes = stmt
            .query_map([], |row| hero_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(heroes)
    }

    pub fn get_hero(&self, id: i64) -> Result<Option<Hero>> {
        let conn = self.lock();
        find_hero(&conn, id)
    }

    /// Returns the hero with its hero powers in creation order.
    pub fn get_hero_detail(&self, id: i64) -> Result<Option<HeroDetail>> {
        let conn = self.lock();
        let Some(hero) = find_hero(&conn, id)? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT hp.id, hp.strength, hp.hero_id, hp.power_id, p.id, p.name, p.description
             FROM hero_powers hp JOIN powers p ON p.id = hp.power_id
             WHERE hp.hero_id = ? ORDER BY hp.id",
        )?;
        let hero_powers = stmt
            .query_map([id], |row| {
                Ok(HeroPowerWithPower {
                    hero_power: hero_power_from_row(row, 0)?,
                    power: power_from_row(row, 4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(HeroDetail { hero, hero_powers }))
    }

    pub fn create_hero(&self, input: CreateHeroInput) -> Result<Hero> {
        let conn = self.lock();
        insert_hero(&conn, input)
    }

    pub fn update_hero(&self, id: i64, input: UpdateHeroInput) -> Result<Option<Hero>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let Some(existing) = find_hero(&tx, id)? else {
            return Ok(None);
        };

        let name = input.name.or(existing.name);
        let super_name = input.super_name.or(existing.super_name);

        tx.execute(
            "UPDATE heroes SET name = ?, super_name = ? WHERE id = ?",
            (&name, &super_name, id),
        )?;
        tx.commit()?;

        Ok(Some(Hero {
            id,
            name,
            super_name,
        }))
    }

    /// Deletes the hero and every hero power it owns.
    pub fn delete_hero(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let cascaded = tx.execute("DELETE FROM hero_powers WHERE hero_id = ?", [id])?;
        let rows = tx.execute("DELETE FROM heroes WHERE id = ?", [id])?;
        tx.commit()?;

        if rows > 0 {
            tracing::info!(hero_id = id, hero_powers = cascaded, "Deleted hero");
        }
        Ok(rows > 0)
    }

    /// The powers a hero holds, one entry per hero power, in creation order.
    pub fn get_powers_for_hero(&self, hero_id: i64) -> Result<Option<Vec<Power>>> {
        let conn = self.lock();
        if find_hero(&conn, hero_id)?.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.description
             FROM hero_powers hp JOIN powers p ON p.id = hp.power_id
             WHERE hp.hero_id = ? ORDER BY hp.id",
        )?;
        let powers = stmt
            .query_map([hero_id], |row| power_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(powers))
    }

    /// Grants a power to a hero. Fails exactly as [`Database::create_hero_power`] does.
    pub fn add_power_to_hero(&self, hero_id: i64, input: AddPowerInput) -> Result<HeroPowerDetail> {
        self.create_hero_power(CreateHeroPowerInput {
            hero_id: Some(hero_id),
            power_id: input.power_id,
            strength: input.strength,
        })
    }

    // ============================================================
    // Power operations
    // ============================================================

    pub fn get_all_powers(&self) -> Result<Vec<Power>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, description FROM powers ORDER BY id")?;
        let powers = stmt
            .query_map([], |row| power_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(powers)
    }

    pub fn get_power(&self, id: i64) -> Result<Option<Power>> {
        let conn = self.lock();
        find_power(&conn, id)
    }

    /// Returns the power with its hero powers in creation order.
    pub fn get_power_detail(&self, id: i64) -> Result<Option<PowerDetail>> {
        let conn = self.lock();
        let Some(power) = find_power(&conn, id)? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT hp.id, hp.strength, hp.hero_id, hp.power_id, h.id, h.name, h.super_name
             FROM hero_powers hp JOIN heroes h ON h.id = hp.hero_id
             WHERE hp.power_id = ? ORDER BY hp.id",
        )?;
        let hero_powers = stmt
            .query_map([id], |row| {
                Ok(HeroPowerWithHero {
                    hero_power: hero_power_from_row(row, 0)?,
                    hero: hero_from_row(row, 4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(PowerDetail { power, hero_powers }))
    }

    pub fn create_power(&self, input: CreatePowerInput) -> Result<Power> {
        let conn = self.lock();
        insert_power(&conn, input)
    }

    /// Partially updates a power. A new description is held to the same
    /// minimum length as on creation.
    pub fn update_power(&self, id: i64, input: UpdatePowerInput) -> Result<Option<Power>> {
        if let Some(description) = &input.description {
            validate_description(description)?;
        }

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let Some(existing) = find_power(&tx, id)? else {
            return Ok(None);
        };

        let name = input.name.or(existing.name);
        let description = input.description.unwrap_or(existing.description);

        tx.execute(
            "UPDATE powers SET name = ?, description = ? WHERE id = ?",
            (&name, &description, id),
        )?;
        tx.commit()?;

        Ok(Some(Power {
            id,
            name,
            description,
        }))
    }

    /// Deletes the power and every hero power it owns.
    pub fn delete_power(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let cascaded = tx.execute("DELETE FROM hero_powers WHERE power_id = ?", [id])?;
        let rows = tx.execute("DELETE FROM powers WHERE id = ?", [id])?;
        tx.commit()?;

        if rows > 0 {
            tracing::info!(power_id = id, hero_powers = cascaded, "Deleted power");
        }
        Ok(rows > 0)
    }

    /// The heroes holding a power, one entry per hero power, in creation order.
    pub fn get_heroes_for_power(&self, power_id: i64) -> Result<Option<Vec<Hero>>> {
        let conn = self.lock();
        if find_power(&conn, power_id)?.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT h.id, h.name, h.super_name
             FROM hero_powers hp JOIN heroes h ON h.id = hp.hero_id
             WHERE hp.power_id = ? ORDER BY hp.id",
        )?;
        let heroes = stmt
            .query_map([power_id], |row| hero_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(heroes))
    }

    /// Grants a power to a hero from the power's side.
    pub fn add_hero_to_power(&self, power_id: i64, input: AddHeroInput) -> Result<HeroPowerDetail> {
        self.create_hero_power(CreateHeroPowerInput {
            hero_id: input.hero_id,
            power_id: Some(power_id),
            strength: input.strength,
        })
    }

    // ============================================================
    // Hero power operations
    // ============================================================

    pub fn get_all_hero_powers(&self) -> Result<Vec<HeroPower>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT id, strength, hero_id, power_id FROM hero_powers ORDER BY id")?;
        let hero_powers = stmt
            .query_map([], |row| hero_power_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hero_powers)
    }

    pub fn get_hero_power(&self, id: i64) -> Result<Option<HeroPower>> {
        let conn = self.lock();
        find_hero_power(&conn, id)
    }

    pub fn get_hero_power_detail(&self, id: i64) -> Result<Option<HeroPowerDetail>> {
        let conn = self.lock();
        let Some(hero_power) = find_hero_power(&conn, id)? else {
            return Ok(None);
        };
        let hero = find_hero(&conn, hero_power.hero_id)?
            .ok_or(Error::not_found("Hero", hero_power.hero_id))?;
        let power = find_power(&conn, hero_power.power_id)?
            .ok_or(Error::not_found("Power", hero_power.power_id))?;

        Ok(Some(HeroPowerDetail {
            hero_power,
            hero,
            power,
        }))
    }

    /// Links a hero to a power.
    ///
    /// The strength and the presence of both ids are checked before anything
    /// is read or written; both referenced rows must exist. On any failure
    /// no row is left behind.
    pub fn create_hero_power(&self, input: CreateHeroPowerInput) -> Result<HeroPowerDetail> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let detail = insert_hero_power(&tx, input)?;
        tx.commit()?;
        Ok(detail)
    }

    /// Changes a hero power's strength, re-running the creation check.
    pub fn update_hero_power(
        &self,
        id: i64,
        input: UpdateHeroPowerInput,
    ) -> Result<Option<HeroPower>> {
        let strength = input
            .strength
            .as_deref()
            .map(str::parse::<Strength>)
            .transpose()?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let Some(existing) = find_hero_power(&tx, id)? else {
            return Ok(None);
        };

        let strength = strength.unwrap_or(existing.strength);
        tx.execute(
            "UPDATE hero_powers SET strength = ? WHERE id = ?",
            (strength, id),
        )?;
        tx.commit()?;

        Ok(Some(HeroPower {
            strength,
            ..existing
        }))
    }

    pub fn delete_hero_power(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM hero_powers WHERE id = ?", [id])?;

        if rows > 0 {
            tracing::info!(hero_power_id = id, "Deleted hero power");
        }
        Ok(rows > 0)
    }

    /// Removes every row from every table, hero powers first.
    pub fn clear(&self) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        clear_tables(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Runs `f` against a single transaction.
    ///
    /// Everything `f` writes is committed together when it returns `Ok`, and
    /// rolled back when it returns an error.
    pub fn batch<T>(&self, f: impl FnOnce(&Batch<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let out = f(&Batch { conn: &*tx })?;
        tx.commit()?;
        Ok(out)
    }
}

/// Writes that share one transaction. Obtained from [`Database::batch`].
pub struct Batch<'a> {
    conn: &'a Connection,
}

impl Batch<'_> {
    pub fn create_hero(&self, input: CreateHeroInput) -> Result<Hero> {
        insert_hero(self.conn, input)
    }

    pub fn create_power(&self, input: CreatePowerInput) -> Result<Power> {
        insert_power(self.conn, input)
    }

    pub fn create_hero_power(&self, input: CreateHeroPowerInput) -> Result<HeroPowerDetail> {
        insert_hero_power(self.conn, input)
    }

    pub fn clear(&self) -> Result<()> {
        clear_tables(self.conn)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<data dir>/superheroes.db` for the current user.
pub fn default_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "superheroes")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("superheroes.db"))
}

fn insert_hero(conn: &Connection, input: CreateHeroInput) -> Result<Hero> {
    conn.execute(
        "INSERT INTO heroes (name, super_name) VALUES (?, ?)",
        (&input.name, &input.super_name),
    )?;
    let id = conn.last_insert_rowid();

    tracing::info!(hero_id = id, "Created hero");
    Ok(Hero {
        id,
        name: input.name,
        super_name: input.super_name,
    })
}

fn insert_power(conn: &Connection, input: CreatePowerInput) -> Result<Power> {
    let description = input.description.unwrap_or_default();
    validate_description(&description)?;

    conn.execute(
        "INSERT INTO powers (name, description) VALUES (?, ?)",
        (&input.name, &description),
    )?;
    let id = conn.last_insert_rowid();

    tracing::info!(power_id = id, "Created power");
    Ok(Power {
        id,
        name: input.name,
        description,
    })
}

/// Checks strength, then id presence, then that both owners exist. Callers
/// run it inside a transaction so a late failure leaves nothing behind.
fn insert_hero_power(conn: &Connection, input: CreateHeroPowerInput) -> Result<HeroPowerDetail> {
    let strength = validate_strength(input.strength.as_deref())?;
    let hero_id = input
        .hero_id
        .ok_or_else(|| Error::validation("Hero is required"))?;
    let power_id = input
        .power_id
        .ok_or_else(|| Error::validation("Power is required"))?;

    let hero = find_hero(conn, hero_id)?.ok_or(Error::not_found("Hero", hero_id))?;
    let power = find_power(conn, power_id)?.ok_or(Error::not_found("Power", power_id))?;

    conn.execute(
        "INSERT INTO hero_powers (strength, hero_id, power_id) VALUES (?, ?, ?)",
        (strength, hero_id, power_id),
    )?;
    let id = conn.last_insert_rowid();

    tracing::info!(hero_power_id = id, hero_id, power_id, %strength, "Created hero power");
    Ok(HeroPowerDetail {
        hero_power: HeroPower {
            id,
            strength,
            hero_id,
            power_id,
        },
        hero,
        power,
    })
}

fn clear_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM hero_powers;
         DELETE FROM heroes;
         DELETE FROM powers;",
    )?;
    Ok(())
}

fn find_hero(conn: &Connection, id: i64) -> Result<Option<Hero>> {
    let hero = conn
        .query_row(
            "SELECT id, name, super_name FROM heroes WHERE id = ?",
            [id],
            |row| hero_from_row(row, 0),
        )
        .optional()?;
    Ok(hero)
}

fn find_power(conn: &Connection, id: i64) -> Result<Option<Power>> {
    let power = conn
        .query_row(
            "SELECT id, name, description FROM powers WHERE id = ?",
            [id],
            |row| power_from_row(row, 0),
        )
        .optional()?;
    Ok(power)
}

fn find_hero_power(conn: &Connection, id: i64) -> Result<Option<HeroPower>> {
    let hero_power = conn
        .query_row(
            "SELECT id, strength, hero_id, power_id FROM hero_powers WHERE id = ?",
            [id],
            |row| hero_power_from_row(row, 0),
        )
        .optional()?;
    Ok(hero_power)
}

// Row readers take the index of their first column so joined rows can be split.

fn hero_from_row(row: &Row, at: usize) -> rusqlite::Result<Hero> {
    Ok(Hero {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        super_name: row.get(at + 2)?,
    })
}

fn power_from_row(row: &Row, at: usize) -> rusqlite::Result<Power> {
    Ok(Power {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        description: row.get(at + 2)?,
    })
}

fn hero_power_from_row(row: &Row, at: usize) -> rusqlite::Result<HeroPower> {
    Ok(HeroPower {
        id: row.get(at)?,
        strength: row.get(at + 1)?,
        hero_id: row.get(at + 2)?,
        power_id: row.get(at + 3)?,
    })
}

impl ToSql for Strength {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Strength {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<Strength>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
