use crate::error::DataError;
use crate::model::{
    ChangeFrequency, HeadTag, OG_LOCALES, ObjectRecord, OgType, Page, PageMetadata,
    ParseValueError, Priority, Robots, SocialImage, TwitterCard,
};
use crate::store::{Column, ContentStore, Filter, FilterValue, ObjectField, OrderBy, PageQuery, SourceId};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub struct Database {
    conn: Connection,
}

/// A page as written by an author. The id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub parent_id: Option<i64>,
    pub class_name: String,
    pub title: String,
    pub url_segment: String,
    pub sort: i64,
    pub last_edited: Option<i64>,
    pub meta: PageMetadata,
}

impl NewPage {
    pub fn new(title: &str, url_segment: &str) -> Self {
        Self {
            parent_id: None,
            class_name: "Page".to_string(),
            title: title.to_string(),
            url_segment: url_segment.to_string(),
            sort: 0,
            last_edited: None,
            meta: PageMetadata::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewObject {
    pub title: String,
    pub url_segment: String,
    pub priority: Priority,
    pub change_frequency: ChangeFrequency,
    pub last_edited: Option<i64>,
}

impl NewObject {
    pub fn new(title: &str, url_segment: &str) -> Self {
        Self {
            title: title.to_string(),
            url_segment: url_segment.to_string(),
            priority: Priority::default(),
            change_frequency: ChangeFrequency::default(),
            last_edited: None,
        }
    }
}

const PAGE_COLUMNS: &str = "id, parent_id, class_name, title, url_segment, sort, last_edited, \
     meta_title, meta_description, canonical, robots, priority, change_frequency, hide_social, \
     og_type, og_locale, twitter_card, social_image";

const OBJECT_COLUMNS: &str = "id, title, url_segment, priority, change_frequency, last_edited";

fn require_text(field: &'static str, value: &str) -> Result<(), DataError> {
    if value.trim().is_empty() {
        return Err(DataError::InvalidValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

fn sql_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Int(i) => Value::Integer(*i),
        FilterValue::Text(s) => Value::Text(s.clone()),
    }
}

fn conversion_error(idx: usize, ty: Type, err: ParseValueError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = ParseValueError>,
{
    row.get::<_, Option<String>>(idx)?
        .map(|raw| raw.parse::<T>().map_err(|e| conversion_error(idx, Type::Text, e)))
        .transpose()
}

fn parse_priority(row: &Row<'_>, idx: usize) -> rusqlite::Result<Priority> {
    let hundredths: i64 = row.get(idx)?;
    Priority::from_hundredths(hundredths).map_err(|e| conversion_error(idx, Type::Integer, e))
}

fn parse_change_frequency(row: &Row<'_>, idx: usize) -> rusqlite::Result<ChangeFrequency> {
    Ok(parse_text(row, idx)?.unwrap_or_default())
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        class_name: row.get(2)?,
        title: row.get(3)?,
        url_segment: row.get(4)?,
        sort: row.get(5)?,
        last_edited: row.get(6)?,
        meta: PageMetadata {
            meta_title: row.get(7)?,
            meta_description: row.get(8)?,
            canonical: row.get(9)?,
            robots: parse_text(row, 10)?,
            priority: parse_priority(row, 11)?,
            change_frequency: parse_change_frequency(row, 12)?,
            hide_social: row.get(13)?,
            og_type: parse_text(row, 14)?,
            og_locale: parse_text(row, 15)?,
            twitter_card: parse_text(row, 16)?,
            social_image: row
                .get::<_, Option<String>>(17)?
                .map(|path| SocialImage { path }),
            head_tags: Vec::new(),
        },
    })
}

fn object_from_row(row: &Row<'_>) -> rusqlite::Result<ObjectRecord> {
    Ok(ObjectRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        url_segment: row.get(2)?,
        priority: parse_priority(row, 3)?,
        change_frequency: parse_change_frequency(row, 4)?,
        last_edited: row.get(5)?,
    })
}

/// Renders the WHERE clause for a page query and collects its bound values.
fn where_clause(filters: &[Filter]) -> (String, Vec<Value>) {
    let mut clauses = Vec::with_capacity(filters.len());
    let mut values = Vec::new();

    for filter in filters {
        match filter {
            Filter::Eq(field, value) => {
                clauses.push(format!("{} = ?", field.column()));
                values.push(to_sql_value(value));
            }
            Filter::Not(field, value) => {
                let col = field.column();
                clauses.push(format!("({col} IS NULL OR {col} != ?)"));
                values.push(to_sql_value(value));
            }
            Filter::NotIn(field, excluded) => {
                let col = field.column();
                let placeholders = vec!["?"; excluded.len()].join(", ");
                clauses.push(format!("({col} IS NULL OR {col} NOT IN ({placeholders}))"));
                values.extend(excluded.iter().map(to_sql_value));
            }
            Filter::IsNull(field) => {
                clauses.push(format!("{} IS NULL", field.column()));
            }
        }
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

fn order_clause<F: Column>(order: Option<OrderBy<F>>) -> String {
    match order {
        Some(order) => format!(
            " ORDER BY {} {}, id ASC",
            order.field.column(),
            order.direction.as_sql()
        ),
        None => " ORDER BY id ASC".to_string(),
    }
}

impl Database {
    /// Deletes the database file along with any WAL sidecar files.
    pub fn remove(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)?;
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = path.as_os_str().to_owned();
            sidecar.push(suffix);
            let sidecar = Path::new(&sidecar);
            if sidecar.exists() {
                fs::remove_file(sidecar)?;
            }
        }
        Ok(())
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self, DataError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), DataError> {
        let robots = sql_list(Robots::ALL.iter().map(|r| r.as_str()));
        let frequencies = sql_list(ChangeFrequency::ALL.iter().map(|f| f.as_str()));
        let og_types = sql_list(OgType::ALL.iter().map(|t| t.as_str()));
        let cards = sql_list(TwitterCard::ALL.iter().map(|c| c.as_str()));
        let locales = sql_list(OG_LOCALES.iter().map(|(code, _)| *code));

        self.conn.execute_batch(&format!(
            "
-- Page tree with per-page SEO metadata
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER,
    class_name TEXT NOT NULL DEFAULT 'Page',
    title TEXT NOT NULL,
    url_segment TEXT NOT NULL,
    sort INTEGER NOT NULL DEFAULT 0,
    last_edited INTEGER,

    meta_title TEXT,
    meta_description TEXT,
    canonical TEXT,
    robots TEXT CHECK(robots IS NULL OR robots IN ({robots})),
    priority INTEGER NOT NULL DEFAULT 50 CHECK(priority BETWEEN 0 AND 100),  -- hundredths
    change_frequency TEXT NOT NULL DEFAULT 'weekly' CHECK(change_frequency IN ({frequencies})),
    hide_social BOOLEAN NOT NULL DEFAULT 0,
    og_type TEXT CHECK(og_type IS NULL OR og_type IN ({og_types})),
    og_locale TEXT CHECK(og_locale IS NULL OR og_locale IN ({locales})),
    twitter_card TEXT CHECK(twitter_card IS NULL OR twitter_card IN ({cards})),
    social_image TEXT,

    FOREIGN KEY(parent_id) REFERENCES pages(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_id);
CREATE INDEX IF NOT EXISTS idx_pages_sort ON pages(sort);

-- Extra head tags, ordered per page
CREATE TABLE IF NOT EXISTS head_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,

    FOREIGN KEY(page_id) REFERENCES pages(id) ON DELETE CASCADE,
    UNIQUE(page_id, position)
);

CREATE INDEX IF NOT EXISTS idx_head_tags_page ON head_tags(page_id);

-- Auxiliary content types and their records
CREATE TABLE IF NOT EXISTS object_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS objects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    url_segment TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 50 CHECK(priority BETWEEN 0 AND 100),
    change_frequency TEXT NOT NULL DEFAULT 'weekly' CHECK(change_frequency IN ({frequencies})),
    last_edited INTEGER,

    FOREIGN KEY(type_id) REFERENCES object_types(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_objects_type ON objects(type_id);
            "
        ))?;
        Ok(())
    }

    // Page operations
    pub fn insert_page(&self, page: &NewPage) -> Result<i64, DataError> {
        require_text("title", &page.title)?;
        if let Some(parent_id) = page.parent_id {
            if !self.page_exists(parent_id)? {
                return Err(DataError::MissingParent(parent_id));
            }
        }

        let meta = &page.meta;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO pages (
                parent_id, class_name, title, url_segment, sort, last_edited,
                meta_title, meta_description, canonical, robots, priority, change_frequency,
                hide_social, og_type, og_locale, twitter_card, social_image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                page.parent_id,
                &page.class_name,
                &page.title,
                &page.url_segment,
                page.sort,
                page.last_edited.unwrap_or_else(current_timestamp),
                &meta.meta_title,
                &meta.meta_description,
                &meta.canonical,
                meta.robots.map(|r| r.as_str()),
                meta.priority.hundredths(),
                meta.change_frequency.as_str(),
                meta.hide_social,
                meta.og_type.map(|t| t.as_str()),
                meta.og_locale.map(|l| l.code()),
                meta.twitter_card.map(|c| c.as_str()),
                meta.social_image.as_ref().map(|i| i.path.as_str()),
            ],
        )?;
        let page_id = tx.last_insert_rowid();
        Self::write_head_tags(&tx, page_id, &meta.head_tags)?;
        tx.commit()?;

        debug!("Inserted page {} ({})", page_id, page.url_segment);
        Ok(page_id)
    }

    pub fn page_exists(&self, page_id: i64) -> Result<bool, DataError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM pages WHERE id = ?1", params![page_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get_page(&self, page_id: i64) -> Result<Page, DataError> {
        let sql = format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS);
        let page = self
            .conn
            .query_row(&sql, params![page_id], page_from_row)
            .optional()?
            .ok_or(DataError::PageNotFound(page_id))?;
        self.with_head_tags(vec![page]).map(|mut pages| pages.remove(0))
    }

    /// Site-relative link built from the URL segments of the page and its ancestors.
    pub fn page_link(&self, page_id: i64) -> Result<String, DataError> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(page_id);

        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let (parent_id, segment): (Option<i64>, String) = self
                .conn
                .query_row(
                    "SELECT parent_id, url_segment FROM pages WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(DataError::PageNotFound(id))?;
            segments.push(segment);
            current = parent_id;
        }

        let mut link = String::from("/");
        for segment in segments.iter().rev() {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                link.push_str(segment);
                link.push('/');
            }
        }
        Ok(link)
    }

    /// Replaces the page's extra head tags, keeping the given order.
    pub fn set_head_tags(&self, page_id: i64, tags: &[HeadTag]) -> Result<(), DataError> {
        if !self.page_exists(page_id)? {
            return Err(DataError::PageNotFound(page_id));
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM head_tags WHERE page_id = ?1", params![page_id])?;
        Self::write_head_tags(&tx, page_id, tags)?;
        tx.commit()?;
        Ok(())
    }

    fn write_head_tags(conn: &Connection, page_id: i64, tags: &[HeadTag]) -> Result<(), DataError> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO head_tags (page_id, position, name, value) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, tag) in tags.iter().enumerate() {
            stmt.execute(params![page_id, position as i64, &tag.name, &tag.value])?;
        }
        Ok(())
    }

    fn head_tags_for(&self, page_id: i64) -> Result<Vec<HeadTag>, DataError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT name, value FROM head_tags WHERE page_id = ?1 ORDER BY position",
        )?;
        let tags = stmt
            .query_map(params![page_id], |row| {
                Ok(HeadTag {
                    name: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn with_head_tags(&self, mut pages: Vec<Page>) -> Result<Vec<Page>, DataError> {
        for page in &mut pages {
            page.meta.head_tags = self.head_tags_for(page.id)?;
        }
        Ok(pages)
    }

    // Auxiliary content types
    pub fn register_object_type(&self, name: &str) -> Result<SourceId, DataError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO object_types (name, created_at) VALUES (?1, ?2)",
            params![name, current_timestamp()],
        )?;
        self.resolve_source(name)
    }

    pub fn list_object_types(&self) -> Result<Vec<String>, DataError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM object_types ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn insert_object(&self, source: &SourceId, object: &NewObject) -> Result<i64, DataError> {
        require_text("title", &object.title)?;
        self.conn.execute(
            "INSERT INTO objects (type_id, title, url_segment, priority, change_frequency, last_edited)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                source.key(),
                &object.title,
                &object.url_segment,
                object.priority.hundredths(),
                object.change_frequency.as_str(),
                object.last_edited.unwrap_or_else(current_timestamp),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

impl ContentStore for Database {
    fn pages(&self, query: &PageQuery) -> Result<Vec<Page>, DataError> {
        let (where_sql, values) = where_clause(&query.filters);
        let sql = format!(
            "SELECT {} FROM pages{}{}",
            PAGE_COLUMNS,
            where_sql,
            order_clause(query.order)
        );
        debug!("Page query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let pages = stmt
            .query_map(params_from_iter(values.iter()), page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        self.with_head_tags(pages)
    }

    fn resolve_source(&self, name: &str) -> Result<SourceId, DataError> {
        self.conn
            .query_row(
                "SELECT id FROM object_types WHERE name = ?1",
                params![name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|key| SourceId::new(key, name))
            .ok_or_else(|| DataError::UnknownSource(name.to_string()))
    }

    fn objects(
        &self,
        source: &SourceId,
        order: Option<OrderBy<ObjectField>>,
    ) -> Result<Vec<ObjectRecord>, DataError> {
        let sql = format!(
            "SELECT {} FROM objects WHERE type_id = ?1{}",
            OBJECT_COLUMNS,
            order_clause(order)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let objects = stmt
            .query_map(params![source.key()], object_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Fetched {} records from source {}", objects.len(), source.name());
        Ok(objects)
    }
}
