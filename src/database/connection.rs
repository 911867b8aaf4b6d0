use std::{error::Error, future::Future};

use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::question::{Options, QuestionRecord};

type DbResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub struct Connection {
    pool: PgPool,
}

impl Connection {
    pub async fn connect(connection_string: &str) -> DbResult<Self> {
        let pool = PgPool::connect(connection_string).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

pub trait CreateQuiz {
    /// Stores a new quiz and returns its name.
    fn create_quiz(
        &self,
        name: &str,
        description: &str,
        author: &str,
    ) -> impl Future<Output = DbResult<String>> + Send;
}

pub trait RetrieveQuiz {
    fn retrieve_all_quiz_names(&self) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    /// The quiz's questions as a JSON array of question records, or `None`
    /// if there is no such quiz.
    fn retrieve_questions_json(
        &self,
        quiz_name: &str,
    ) -> impl Future<Output = DbResult<Option<String>>> + Send;
}

pub trait RetrieveQuestion {
    fn retrieve_all_question_texts(
        &self,
        quiz_name: &str,
    ) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    /// The first question of the quiz with this text, with its id.
    fn retrieve_question(
        &self,
        quiz_name: &str,
        question_text: &str,
    ) -> impl Future<Output = DbResult<Option<(Uuid, QuestionRecord)>>> + Send;
}

pub trait CreateQuestion {
    fn create_question(
        &self,
        quiz_name: &str,
        question: &QuestionRecord,
    ) -> impl Future<Output = DbResult<Uuid>> + Send;
}

pub trait UpdateQuestion {
    /// Overwrites question `id`. Returns how many questions were changed.
    fn update_question(
        &self,
        id: Uuid,
        question: &QuestionRecord,
    ) -> impl Future<Output = DbResult<u64>> + Send;
}

pub trait DeleteQuestion {
    /// Returns how many questions were removed.
    fn delete_question(
        &self,
        quiz_name: &str,
        question_text: &str,
    ) -> impl Future<Output = DbResult<u64>> + Send;
}

impl CreateQuiz for Connection {
    async fn create_quiz(&self, name: &str, description: &str, author: &str) -> DbResult<String> {
        tracing::debug!(name, "adding quiz");
        let name: String = sqlx::query_scalar(
            "INSERT INTO quizes (id, name, description, author)
             VALUES ($1, $2, $3, $4) RETURNING name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;
        Ok(name)
    }
}

impl RetrieveQuiz for Connection {
    async fn retrieve_all_quiz_names(&self) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM quizes ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn retrieve_questions_json(&self, quiz_name: &str) -> DbResult<Option<String>> {
        let quiz_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM quizes WHERE name = $1")
            .bind(quiz_name)
            .fetch_optional(&self.pool)
            .await?;
        let Some(quiz_id) = quiz_id else {
            return Ok(None);
        };

        let questions: String = sqlx::query_scalar(
            "SELECT COALESCE(
                 json_agg(
                     json_build_object(
                         'text', question_text,
                         'options', options,
                         'correct_answer', correct_answer,
                         'explanation', explanation
                     ) ORDER BY seq
                 ),
                 '[]'::json
             )::text
             FROM questions WHERE quiz_id = $1",
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Some(questions))
    }
}

impl RetrieveQuestion for Connection {
    async fn retrieve_all_question_texts(&self, quiz_name: &str) -> DbResult<Vec<String>> {
        let texts = sqlx::query_scalar(
            "SELECT q.question_text FROM questions q
             JOIN quizes z ON z.id = q.quiz_id
             WHERE z.name = $1 ORDER BY q.seq",
        )
        .bind(quiz_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(texts)
    }

    async fn retrieve_question(
        &self,
        quiz_name: &str,
        question_text: &str,
    ) -> DbResult<Option<(Uuid, QuestionRecord)>> {
        let row: Option<(Uuid, String, String, String, Option<String>)> = sqlx::query_as(
            "SELECT q.id, q.question_text, q.options::text, q.correct_answer, q.explanation
             FROM questions q
             JOIN quizes z ON z.id = q.quiz_id
             WHERE z.name = $1 AND q.question_text = $2
             ORDER BY q.seq LIMIT 1",
        )
        .bind(quiz_name)
        .bind(question_text)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, text, options, correct_answer, explanation)) = row else {
            return Ok(None);
        };
        let options: Options = serde_json::from_str(&options)?;
        Ok(Some((
            id,
            QuestionRecord::new(text, options, correct_answer, explanation),
        )))
    }
}

impl CreateQuestion for Connection {
    async fn create_question(&self, quiz_name: &str, question: &QuestionRecord) -> DbResult<Uuid> {
        let id = Uuid::new_v4();
        let options = serde_json::to_string(question.options())?;
        tracing::debug!(%id, quiz_name, "adding question");
        let inserted = sqlx::query(
            "INSERT INTO questions
                 (id, quiz_id, question_text, options, correct_answer, explanation)
             SELECT $1, id, $3, $4::json, $5, $6 FROM quizes WHERE name = $2",
        )
        .bind(id)
        .bind(quiz_name)
        .bind(question.text())
        .bind(options)
        .bind(question.correct_answer())
        .bind(question.explanation())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(format!("quiz '{quiz_name}' not found").into());
        }
        Ok(id)
    }
}

impl UpdateQuestion for Connection {
    async fn update_question(&self, id: Uuid, question: &QuestionRecord) -> DbResult<u64> {
        let options = serde_json::to_string(question.options())?;
        let updated = sqlx::query(
            "UPDATE questions
             SET question_text = $2, options = $3::json, correct_answer = $4, explanation = $5
             WHERE id = $1",
        )
        .bind(id)
        .bind(question.text())
        .bind(options)
        .bind(question.correct_answer())
        .bind(question.explanation())
        .execute(&self.pool)
        .await?
        .rows_affected();
        tracing::debug!(%id, updated, "updated question");
        Ok(updated)
    }
}

impl DeleteQuestion for Connection {
    async fn delete_question(&self, quiz_name: &str, question_text: &str) -> DbResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM questions q USING quizes z
             WHERE z.id = q.quiz_id AND z.name = $1 AND q.question_text = $2",
        )
        .bind(quiz_name)
        .bind(question_text)
        .execute(&self.pool)
        .await?
        .rows_affected();
        tracing::debug!(quiz_name, deleted, "deleted questions");
        Ok(deleted)
    }
}
