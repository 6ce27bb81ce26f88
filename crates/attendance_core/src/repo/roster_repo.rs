//! Roster store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist students and teachers in an explicit, stable order.
//! - Seed the default roster into an empty store.
//!
//! # Invariants
//! - `position` defines roster order within each role and only grows.
//! - Member ids are unique across roles.

use crate::model::roster::{RosterMember, RosterRole};
use crate::repo::record_repo::{RepoError, RepoResult};
use crate::repo::schema::ensure_connection_ready;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for roster reads and maintenance.
pub trait RosterRepository {
    /// Lists members of one role in roster order.
    fn list_members(&self, role: RosterRole) -> RepoResult<Vec<RosterMember>>;
    /// Finds one member of the given role by id.
    fn find_member(&self, role: RosterRole, id: &str) -> RepoResult<Option<RosterMember>>;
    /// Appends a member at the end of its role's order.
    fn add_member(&self, member: &RosterMember) -> RepoResult<()>;
    /// Changes a member's display name. Returns `false` when the id is unknown.
    fn rename_member(&self, id: &str, name: &str) -> RepoResult<bool>;
    /// Inserts `members` only when the roster is empty. Returns whether it seeded.
    fn seed_if_empty(&self, members: &[RosterMember]) -> RepoResult<bool>;
}

/// SQLite-backed roster repository.
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "roster_members")?;
        Ok(Self { conn })
    }
}

impl RosterRepository for SqliteRosterRepository<'_> {
    fn list_members(&self, role: RosterRole) -> RepoResult<Vec<RosterMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind
             FROM roster_members
             WHERE kind = ?1
             ORDER BY position ASC, id ASC;",
        )?;
        let mut rows = stmt.query([role.as_str()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn find_member(&self, role: RosterRole, id: &str) -> RepoResult<Option<RosterMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind
             FROM roster_members
             WHERE kind = ?1
               AND id = ?2;",
        )?;
        let mut rows = stmt.query(params![role.as_str(), id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn add_member(&self, member: &RosterMember) -> RepoResult<()> {
        insert_member(self.conn, member)
    }

    fn rename_member(&self, id: &str, name: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE roster_members SET name = ?1 WHERE id = ?2;",
            params![name, id],
        )?;
        Ok(changed > 0)
    }

    fn seed_if_empty(&self, members: &[RosterMember]) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing: i64 =
            tx.query_row("SELECT COUNT(*) FROM roster_members;", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(false);
        }

        for member in members {
            insert_member(&tx, member)?;
        }
        tx.commit()?;
        Ok(true)
    }
}

fn insert_member(conn: &Connection, member: &RosterMember) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO roster_members (id, kind, name, position)
         SELECT ?1, ?2, ?3, COALESCE(MAX(position), 0) + 1
         FROM roster_members
         WHERE kind = ?2;",
        params![member.id, member.role.as_str(), member.name],
    )?;
    Ok(())
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<RosterMember> {
    let kind_text: String = row.get("kind")?;
    let role = RosterRole::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in roster_members.kind"))
    })?;
    Ok(RosterMember {
        id: row.get("id")?,
        name: row.get("name")?,
        role,
    })
}
