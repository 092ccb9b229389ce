//! Postgres implementation of [`Store`].
//!
//! Bulk writes bind one array per column and expand them with `UNNEST`, so each
//! batch is a single round trip regardless of size.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use super::Store;
use super::models::{
    ClassAlert, Course, CourseCareer, CourseSection, GlobalSettings, Instructor, NewCourse,
    NewCourseSection, NewInstructionEntry, Recipient, School, SearchContext, SearchKey, Subject,
    Term, WatchedSection,
};
use crate::globalsearch::models::{GsCareer, GsSchool, GsSubject, GsTerm, SectionStatus};

/// [`Store`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert `(name, key)` rows into a keyed reference table and return every row
    /// whose key was requested.
    async fn upsert_keyed<T>(&self, table: KeyedTable, entries: &[(&str, &str)]) -> Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<&str> = entries.iter().map(|(name, _)| *name).collect();
        let keys: Vec<&str> = entries.iter().map(|(_, key)| *key).collect();

        sqlx::query(table.insert_sql())
            .bind(&names)
            .bind(&keys)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert into {}", table.name()))?;

        let rows = sqlx::query_as::<_, T>(table.select_sql())
            .bind(&keys)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn link_pairs(&self, sql: &'static str, left: &[i32], right: &[i32]) -> Result<()> {
        if left.is_empty() || right.is_empty() {
            return Ok(());
        }
        sqlx::query(sql)
            .bind(left)
            .bind(right)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Reference tables keyed by `globalsearch_key` with a `name` column.
#[derive(Debug, Clone, Copy)]
enum KeyedTable {
    Schools,
    Careers,
    Subjects,
}

impl KeyedTable {
    fn name(self) -> &'static str {
        match self {
            Self::Schools => "schools",
            Self::Careers => "course_careers",
            Self::Subjects => "subjects",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Self::Schools => {
                r#"
                INSERT INTO schools (name, globalsearch_key)
                SELECT * FROM UNNEST($1::text[], $2::text[])
                ON CONFLICT (globalsearch_key) DO NOTHING
                "#
            }
            Self::Careers => {
                r#"
                INSERT INTO course_careers (name, globalsearch_key)
                SELECT * FROM UNNEST($1::text[], $2::text[])
                ON CONFLICT (globalsearch_key) DO NOTHING
                "#
            }
            Self::Subjects => {
                r#"
                INSERT INTO subjects (name, globalsearch_key)
                SELECT * FROM UNNEST($1::text[], $2::text[])
                ON CONFLICT (globalsearch_key) DO NOTHING
                "#
            }
        }
    }

    fn select_sql(self) -> &'static str {
        match self {
            Self::Schools => {
                "SELECT id, name, globalsearch_key, is_preferred FROM schools \
                 WHERE globalsearch_key = ANY($1) ORDER BY id"
            }
            Self::Careers => {
                "SELECT id, name, globalsearch_key, is_preferred FROM course_careers \
                 WHERE globalsearch_key = ANY($1) ORDER BY id"
            }
            Self::Subjects => {
                "SELECT id, name, globalsearch_key, is_preferred FROM subjects \
                 WHERE globalsearch_key = ANY($1) ORDER BY id"
            }
        }
    }
}

const INSERT_SECTION_SQL: &str = r#"
    INSERT INTO course_sections
        (gs_unique_id, number, section_name, topic, url, instruction_mode, status, course_id, term_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT DO NOTHING
    RETURNING id, gs_unique_id, number, section_name, topic, url, instruction_mode, status,
              course_id, term_id
"#;

/// Flat row of the watch-list join.
#[derive(sqlx::FromRow)]
struct WatchedRow {
    recipient_id: i32,
    recipient_name: String,
    recipient_description: String,
    is_contact_by_phone: bool,
    phone_number: Option<String>,
    section_id: i32,
    gs_unique_id: String,
    number: i32,
    section_name: String,
    topic: String,
    url: String,
    instruction_mode: String,
    status: SectionStatus,
    course_id: i32,
    term_id: i32,
    code: String,
    level: String,
    title: String,
    designation: String,
    subject_id: i32,
    career_id: i32,
    school_id: i32,
}

impl From<WatchedRow> for WatchedSection {
    fn from(row: WatchedRow) -> Self {
        Self {
            recipient: Recipient {
                id: row.recipient_id,
                name: row.recipient_name,
                description: row.recipient_description,
                is_contact_by_phone: row.is_contact_by_phone,
                phone_number: row.phone_number,
            },
            section: CourseSection {
                id: row.section_id,
                gs_unique_id: row.gs_unique_id,
                number: row.number,
                section_name: row.section_name,
                topic: row.topic,
                url: row.url,
                instruction_mode: row.instruction_mode,
                status: row.status,
                course_id: row.course_id,
                term_id: row.term_id,
            },
            course: Course {
                id: row.course_id,
                code: row.code,
                level: row.level,
                title: row.title,
                designation: row.designation,
                subject_id: row.subject_id,
                career_id: row.career_id,
                school_id: row.school_id,
            },
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_terms(&self, terms: &[GsTerm]) -> Result<Vec<Term>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<&str> = terms.iter().map(|t| t.name.as_str()).collect();
        let years: Vec<i32> = terms.iter().map(|t| t.year).collect();
        let keys: Vec<&str> = terms.iter().map(|t| t.globalsearch_key.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO terms (name, year, globalsearch_key)
            SELECT * FROM UNNEST($1::text[], $2::int4[], $3::text[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&names)
        .bind(&years)
        .bind(&keys)
        .execute(&self.pool)
        .await
        .context("Failed to insert terms")?;

        let rows = sqlx::query_as::<_, Term>(
            r#"
            SELECT id, name, year, globalsearch_key, is_available, is_preferred
            FROM terms
            WHERE globalsearch_key = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&keys)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_schools(&self, schools: &[GsSchool]) -> Result<Vec<School>> {
        let entries: Vec<(&str, &str)> = schools
            .iter()
            .map(|s| (s.name.as_str(), s.globalsearch_key.as_str()))
            .collect();
        self.upsert_keyed(KeyedTable::Schools, &entries).await
    }

    async fn upsert_careers(&self, careers: &[GsCareer]) -> Result<Vec<CourseCareer>> {
        let entries: Vec<(&str, &str)> = careers
            .iter()
            .map(|c| (c.name.as_str(), c.globalsearch_key.as_str()))
            .collect();
        self.upsert_keyed(KeyedTable::Careers, &entries).await
    }

    async fn upsert_subjects(&self, subjects: &[GsSubject]) -> Result<Vec<Subject>> {
        let entries: Vec<(&str, &str)> = subjects
            .iter()
            .map(|s| (s.name.as_str(), s.globalsearch_key.as_str()))
            .collect();
        self.upsert_keyed(KeyedTable::Subjects, &entries).await
    }

    async fn upsert_instructors(&self, school_id: i32, names: &[String]) -> Result<Vec<Instructor>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query(
            r#"
            INSERT INTO instructors (name, school_id)
            SELECT name, $2 FROM UNNEST($1::text[]) AS name
            ON CONFLICT (name, school_id) DO NOTHING
            "#,
        )
        .bind(names)
        .bind(school_id)
        .execute(&self.pool)
        .await
        .context("Failed to insert instructors")?;

        let rows = sqlx::query_as::<_, Instructor>(
            r#"
            SELECT id, name, school_id
            FROM instructors
            WHERE school_id = $1 AND name = ANY($2)
            ORDER BY id
            "#,
        )
        .bind(school_id)
        .bind(names)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_courses(&self, courses: &[NewCourse]) -> Result<Vec<Course>> {
        if courses.is_empty() {
            return Ok(Vec::new());
        }

        let codes: Vec<&str> = courses.iter().map(|c| c.code.as_str()).collect();
        let levels: Vec<&str> = courses.iter().map(|c| c.level.as_str()).collect();
        let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        let designations: Vec<&str> = courses.iter().map(|c| c.designation.as_str()).collect();
        let subject_ids: Vec<i32> = courses.iter().map(|c| c.subject_id).collect();
        let career_ids: Vec<i32> = courses.iter().map(|c| c.career_id).collect();
        let school_ids: Vec<i32> = courses.iter().map(|c| c.school_id).collect();

        sqlx::query(
            r#"
            INSERT INTO courses (code, level, title, designation, subject_id, career_id, school_id)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[],
                $5::int4[], $6::int4[], $7::int4[]
            )
            ON CONFLICT (code, level, school_id) DO NOTHING
            "#,
        )
        .bind(&codes)
        .bind(&levels)
        .bind(&titles)
        .bind(&designations)
        .bind(&subject_ids)
        .bind(&career_ids)
        .bind(&school_ids)
        .execute(&self.pool)
        .await
        .context("Failed to insert courses")?;

        let rows = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.id, c.code, c.level, c.title, c.designation,
                   c.subject_id, c.career_id, c.school_id
            FROM courses c
            WHERE (c.code, c.level, c.school_id) IN (
                SELECT * FROM UNNEST($1::text[], $2::text[], $3::int4[])
            )
            ORDER BY c.id
            "#,
        )
        .bind(&codes)
        .bind(&levels)
        .bind(&school_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_or_create_section(
        &self,
        section: &NewCourseSection,
    ) -> Result<(CourseSection, bool)> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, CourseSection>(INSERT_SECTION_SQL)
            .bind(&section.gs_unique_id)
            .bind(section.number)
            .bind(&section.section_name)
            .bind(&section.topic)
            .bind(&section.url)
            .bind(&section.instruction_mode)
            .bind(section.status)
            .bind(section.course_id)
            .bind(section.term_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(created) = inserted {
            tx.commit().await?;
            return Ok((created, true));
        }

        let existing = sqlx::query_as::<_, CourseSection>(
            r#"
            SELECT id, gs_unique_id, number, section_name, topic, url, instruction_mode, status,
                   course_id, term_id
            FROM course_sections
            WHERE gs_unique_id = $1
            "#,
        )
        .bind(&section.gs_unique_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        let existing = existing.with_context(|| {
            format!(
                "Section {} (term {}) conflicts with a stored section under a different unique id than {:?}",
                section.number, section.term_id, section.gs_unique_id
            )
        })?;
        Ok((existing, false))
    }

    async fn update_section(&self, id: i32, section: &NewCourseSection) -> Result<CourseSection> {
        let updated = sqlx::query_as::<_, CourseSection>(
            r#"
            UPDATE course_sections
            SET number = $2, section_name = $3, topic = $4, url = $5, instruction_mode = $6,
                status = $7, course_id = $8, term_id = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING id, gs_unique_id, number, section_name, topic, url, instruction_mode,
                      status, course_id, term_id
            "#,
        )
        .bind(id)
        .bind(section.number)
        .bind(&section.section_name)
        .bind(&section.topic)
        .bind(&section.url)
        .bind(&section.instruction_mode)
        .bind(section.status)
        .bind(section.course_id)
        .bind(section.term_id)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to update section {id}"))?;
        Ok(updated)
    }

    async fn replace_instruction_entries(
        &self,
        section_id: i32,
        entries: &[NewInstructionEntry],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM instruction_entries WHERE course_section_id = $1")
            .bind(section_id)
            .execute(&mut *tx)
            .await?;

        if entries.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let days: Vec<i16> = entries.iter().map(|e| e.days.to_db()).collect();
        let start_times: Vec<Option<NaiveTime>> = entries.iter().map(|e| e.start_time).collect();
        let end_times: Vec<Option<NaiveTime>> = entries.iter().map(|e| e.end_time).collect();
        let buildings: Vec<&str> = entries.iter().map(|e| e.building.as_str()).collect();
        let rooms: Vec<&str> = entries.iter().map(|e| e.room.as_str()).collect();
        let floors: Vec<&str> = entries.iter().map(|e| e.floor_number.as_str()).collect();
        let start_dates: Vec<Option<NaiveDate>> = entries.iter().map(|e| e.start_date).collect();
        let end_dates: Vec<Option<NaiveDate>> = entries.iter().map(|e| e.end_date).collect();
        let instructor_ids: Vec<i32> = entries.iter().map(|e| e.instructor_id).collect();
        let term_ids: Vec<i32> = entries.iter().map(|e| e.term_id).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO instruction_entries (
                days, start_time, end_time, building, room, floor_number,
                start_date, end_date, instructor_id, term_id, course_section_id
            )
            SELECT d, st, et, b, r, f, sd, ed, i, t, $11
            FROM UNNEST(
                $1::int2[], $2::time[], $3::time[], $4::text[], $5::text[], $6::text[],
                $7::date[], $8::date[], $9::int4[], $10::int4[]
            ) WITH ORDINALITY AS e(d, st, et, b, r, f, sd, ed, i, t, ord)
            ORDER BY ord
            ON CONFLICT ON CONSTRAINT instruction_entries_block_key DO NOTHING
            "#,
        )
        .bind(&days)
        .bind(&start_times)
        .bind(&end_times)
        .bind(&buildings)
        .bind(&rooms)
        .bind(&floors)
        .bind(&start_dates)
        .bind(&end_dates)
        .bind(&instructor_ids)
        .bind(&term_ids)
        .bind(section_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert instruction entries for section {section_id}"))?;

        tx.commit().await?;
        Ok(result.rows_affected() as usize)
    }

    async fn mark_available_terms(&self, term_ids: &[i32]) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE terms
            SET is_available = (id = ANY($1)), updated_at = NOW()
            WHERE is_available <> (id = ANY($1))
            "#,
        )
        .bind(term_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn link_terms_to_schools(&self, term_ids: &[i32], school_ids: &[i32]) -> Result<()> {
        self.link_pairs(
            r#"
            INSERT INTO term_schools (term_id, school_id)
            SELECT t, s FROM UNNEST($1::int4[]) AS t CROSS JOIN UNNEST($2::int4[]) AS s
            ON CONFLICT DO NOTHING
            "#,
            term_ids,
            school_ids,
        )
        .await
    }

    async fn link_careers(&self, school_id: i32, term_id: i32, career_ids: &[i32]) -> Result<()> {
        self.link_pairs(
            r#"
            INSERT INTO career_terms (career_id, term_id)
            SELECT c, t FROM UNNEST($1::int4[]) AS c CROSS JOIN UNNEST($2::int4[]) AS t
            ON CONFLICT DO NOTHING
            "#,
            career_ids,
            &[term_id],
        )
        .await?;
        self.link_pairs(
            r#"
            INSERT INTO career_schools (career_id, school_id)
            SELECT c, s FROM UNNEST($1::int4[]) AS c CROSS JOIN UNNEST($2::int4[]) AS s
            ON CONFLICT DO NOTHING
            "#,
            career_ids,
            &[school_id],
        )
        .await
    }

    async fn link_subjects(&self, school_id: i32, term_id: i32, subject_ids: &[i32]) -> Result<()> {
        self.link_pairs(
            r#"
            INSERT INTO subject_terms (subject_id, term_id)
            SELECT s, t FROM UNNEST($1::int4[]) AS s CROSS JOIN UNNEST($2::int4[]) AS t
            ON CONFLICT DO NOTHING
            "#,
            subject_ids,
            &[term_id],
        )
        .await?;
        self.link_pairs(
            r#"
            INSERT INTO subject_schools (subject_id, school_id)
            SELECT s, sc FROM UNNEST($1::int4[]) AS s CROSS JOIN UNNEST($2::int4[]) AS sc
            ON CONFLICT DO NOTHING
            "#,
            subject_ids,
            &[school_id],
        )
        .await
    }

    async fn link_courses_to_term(&self, term_id: i32, course_ids: &[i32]) -> Result<()> {
        self.link_pairs(
            r#"
            INSERT INTO course_terms (course_id, term_id)
            SELECT c, t FROM UNNEST($1::int4[]) AS c CROSS JOIN UNNEST($2::int4[]) AS t
            ON CONFLICT DO NOTHING
            "#,
            course_ids,
            &[term_id],
        )
        .await
    }

    async fn link_instructors_to_term(&self, term_id: i32, instructor_ids: &[i32]) -> Result<()> {
        self.link_pairs(
            r#"
            INSERT INTO instructor_terms (instructor_id, term_id)
            SELECT i, t FROM UNNEST($1::int4[]) AS i CROSS JOIN UNNEST($2::int4[]) AS t
            ON CONFLICT DO NOTHING
            "#,
            instructor_ids,
            &[term_id],
        )
        .await
    }

    async fn search_context(&self, key: SearchKey) -> Result<Option<SearchContext>> {
        let school = sqlx::query_as::<_, School>(
            "SELECT id, name, globalsearch_key, is_preferred FROM schools WHERE id = $1",
        )
        .bind(key.school_id)
        .fetch_optional(&self.pool)
        .await?;
        let term = sqlx::query_as::<_, Term>(
            "SELECT id, name, year, globalsearch_key, is_available, is_preferred FROM terms WHERE id = $1",
        )
        .bind(key.term_id)
        .fetch_optional(&self.pool)
        .await?;
        let subject = sqlx::query_as::<_, Subject>(
            "SELECT id, name, globalsearch_key, is_preferred FROM subjects WHERE id = $1",
        )
        .bind(key.subject_id)
        .fetch_optional(&self.pool)
        .await?;
        let career = sqlx::query_as::<_, CourseCareer>(
            "SELECT id, name, globalsearch_key, is_preferred FROM course_careers WHERE id = $1",
        )
        .bind(key.career_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match (school, term, subject, career) {
            (Some(school), Some(term), Some(subject), Some(career)) => Some(SearchContext {
                school,
                term,
                subject,
                career,
            }),
            _ => None,
        })
    }

    async fn find_school(&self, key_or_name: &str) -> Result<Option<School>> {
        let school = sqlx::query_as::<_, School>(
            "SELECT id, name, globalsearch_key, is_preferred FROM schools
            WHERE globalsearch_key = $1 OR name = $1 ORDER BY globalsearch_key = $1 DESC LIMIT 1",
        )
        .bind(key_or_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(school)
    }

    async fn find_term(&self, key_or_name: &str) -> Result<Option<Term>> {
        let term = sqlx::query_as::<_, Term>(
            r#"
            SELECT id, name, year, globalsearch_key, is_available, is_preferred
            FROM terms WHERE globalsearch_key = $1 OR name = $1
            ORDER BY globalsearch_key = $1 DESC LIMIT 1
            "#,
        )
        .bind(key_or_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(term)
    }

    async fn find_subject(&self, key_or_name: &str) -> Result<Option<Subject>> {
        let subject = sqlx::query_as::<_, Subject>(
            "SELECT id, name, globalsearch_key, is_preferred FROM subjects
            WHERE globalsearch_key = $1 OR name = $1 ORDER BY globalsearch_key = $1 DESC LIMIT 1",
        )
        .bind(key_or_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subject)
    }

    async fn find_career(&self, key_or_name: &str) -> Result<Option<CourseCareer>> {
        let career = sqlx::query_as::<_, CourseCareer>(
            r#"
            SELECT id, name, globalsearch_key, is_preferred
            FROM course_careers WHERE globalsearch_key = $1 OR name = $1
            ORDER BY globalsearch_key = $1 DESC LIMIT 1
            "#,
        )
        .bind(key_or_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(career)
    }

    async fn watched_sections(&self) -> Result<Vec<WatchedSection>> {
        let rows = sqlx::query_as::<_, WatchedRow>(
            r#"
            SELECT r.id AS recipient_id, r.name AS recipient_name,
                   r.description AS recipient_description, r.is_contact_by_phone,
                   phone.number AS phone_number,
                   cs.id AS section_id, cs.gs_unique_id, cs.number, cs.section_name, cs.topic,
                   cs.url, cs.instruction_mode, cs.status, cs.course_id, cs.term_id,
                   c.code, c.level, c.title, c.designation, c.subject_id, c.career_id, c.school_id
            FROM recipient_watched_sections w
            JOIN recipients r ON r.id = w.recipient_id
            JOIN course_sections cs ON cs.id = w.course_section_id
            JOIN courses c ON c.id = cs.course_id
            LEFT JOIN LATERAL (
                SELECT ci.number
                FROM contact_infos ci
                WHERE ci.recipient_id = r.id AND ci.is_enabled
                ORDER BY ci.id
                LIMIT 1
            ) phone ON TRUE
            ORDER BY r.id, cs.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load watched sections")?;

        Ok(rows.into_iter().map(WatchedSection::from).collect())
    }

    async fn recent_alerts(&self, since: DateTime<Utc>) -> Result<Vec<ClassAlert>> {
        let alerts = sqlx::query_as::<_, ClassAlert>(
            r#"
            SELECT id, recipient_id, course_section_id, created_at
            FROM class_alerts
            WHERE created_at > $1
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn insert_alerts(&self, pairs: &[(i32, i32)]) -> Result<usize> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let recipient_ids: Vec<i32> = pairs.iter().map(|(r, _)| *r).collect();
        let section_ids: Vec<i32> = pairs.iter().map(|(_, s)| *s).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO class_alerts (recipient_id, course_section_id)
            SELECT * FROM UNNEST($1::int4[], $2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&recipient_ids)
        .bind(&section_ids)
        .execute(&self.pool)
        .await
        .context("Failed to insert class alerts")?;
        Ok(result.rows_affected() as usize)
    }

    async fn global_settings(&self) -> Result<Option<GlobalSettings>> {
        let settings = sqlx::query_as::<_, GlobalSettings>(
            "SELECT hours_renotify_grace_period FROM global_settings LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn instructor_names(&self, section_id: i32) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT i.name
            FROM instruction_entries e
            JOIN instructors i ON i.id = e.instructor_id
            WHERE e.course_section_id = $1
            ORDER BY e.id
            "#,
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
