use serde::Serialize;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    llm::ChatProvider,
    models::chat::ChatMessage,
    models::course::CourseWithInstructor,
    repositories::{chat as chat_repo, course as course_repo},
    state::AppState,
};

/// Global and per-user request counters against the platform cap.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsage {
    pub total_api_requests: i64,
    pub user_requests: i64,
    pub remaining_requests: i64,
}

/// The outcome of a generation: the text plus refreshed counters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub response: String,
    pub api_usage: ApiUsage,
}

/// One page of a user's chat history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    pub chats: Vec<ChatMessage>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_chats: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// Builds the assistant's system prompt from the current course catalog.
fn build_system_prompt(courses: &[CourseWithInstructor]) -> String {
    let course_context = courses
        .iter()
        .map(|c| {
            format!(
                "- {}: {} (Instructor: {})",
                c.course.title, c.course.description, c.instructor.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are EduBot, a helpful assistant for an online learning platform.\n\n\
         Available courses:\n{}\n\n\
         Help students with:\n\
         - Course recommendations based on interests/goals\n\
         - Course information and prerequisites\n\
         - Learning paths and study advice\n\
         - Platform navigation\n\n\
         Be friendly, concise, and educational-focused. Redirect off-topic questions politely.",
        course_context
    )
}

async fn usage_counters(state: &AppState, user_id: &Uuid) -> Result<ApiUsage> {
    let total = chat_repo::count_all(&state.db).await?;
    let user = chat_repo::count_for_user(&state.db, user_id).await?;
    Ok(ApiUsage {
        total_api_requests: total,
        user_requests: user,
        remaining_requests: (state.config.chat_request_limit - total).max(0),
    })
}

/// Current usage counters for the authenticated user.
pub async fn usage(state: &AppState, user_id: Uuid) -> Result<ApiUsage> {
    usage_counters(state, &user_id).await
}

/// Generates a chat response through the given provider.
///
/// Validates the prompt, enforces the global request cap, assembles course
/// context, calls the provider and persists the exchange before reporting
/// refreshed counters.
pub async fn generate(
    state: &AppState,
    provider: &dyn ChatProvider,
    user_id: Uuid,
    prompt: &str,
) -> Result<GenerationResult> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Prompt is required".to_string()));
    }

    let limit = state.config.chat_request_limit;
    let total = chat_repo::count_all(&state.db).await?;
    if total >= limit {
        return Err(AppError::RateLimitExceeded(format!(
            "API request limit reached ({}/{})",
            limit, limit
        )));
    }

    let courses = course_repo::list_with_instructor(&state.db).await?;
    let system_prompt = build_system_prompt(&courses);

    tracing::debug!("🤖 Generating response via {}", provider.name());
    let response = provider.generate(&system_prompt, prompt).await?;

    chat_repo::insert(&state.db, Uuid::new_v4(), &user_id, prompt, &response).await?;
    tracing::info!("✅ Chat exchange stored for user {}", user_id);

    Ok(GenerationResult {
        response,
        api_usage: usage_counters(state, &user_id).await?,
    })
}

/// A page of the user's chat history, newest first.
pub async fn history(state: &AppState, user_id: Uuid, page: i64, limit: i64) -> Result<ChatHistory> {
    let page = page.max(1);
    let limit = limit.max(1);
    let offset = (page - 1) * limit;

    let chats = chat_repo::list_page_for_user(&state.db, &user_id, limit, offset).await?;
    let total = chat_repo::count_for_user(&state.db, &user_id).await?;
    let pages = total_pages(total, limit);

    Ok(ChatHistory {
        chats,
        pagination: Pagination {
            current_page: page,
            total_pages: pages,
            total_chats: total,
            has_next: page < pages,
            has_prev: page > 1,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::{Course, CourseStatus, InstructorInfo};
    use chrono::Utc;

    fn course(title: &str, description: &str, instructor: &str) -> CourseWithInstructor {
        CourseWithInstructor {
            course: Course {
                id: Uuid::new_v4(),
                title: title.to_string(),
                description: description.to_string(),
                instructor_id: Uuid::new_v4(),
                status: CourseStatus::Published,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            instructor: InstructorInfo {
                id: Uuid::new_v4(),
                name: instructor.to_string(),
                email: format!("{}@demo.com", instructor.to_lowercase()),
            },
        }
    }

    #[test]
    fn system_prompt_lists_every_course() {
        let courses = vec![
            course("Intro to React", "Learn the fundamentals", "John"),
            course("Advanced JavaScript", "Master the patterns", "Maria"),
        ];
        let prompt = build_system_prompt(&courses);

        assert!(prompt.contains("- Intro to React: Learn the fundamentals (Instructor: John)"));
        assert!(prompt.contains("- Advanced JavaScript: Master the patterns (Instructor: Maria)"));
        assert!(prompt.starts_with("You are EduBot"));
    }

    #[test]
    fn page_arithmetic_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }
}
