mod common;

use axum::http::StatusCode;
use serde_json::json;

/// Pick any option that is not the correct answer.
fn wrong_option(question: &serde_json::Value) -> String {
    let answer = question["answer"].as_str().unwrap();
    question["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_str().unwrap())
        .find(|o| *o != answer)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_submit_correct_answer() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("correct-user");

    let questions = common::fetch_questions(&app, &user_id, "prenatal", 3).await;
    let question = &questions[0];

    let (status, body) = common::post_json(
        &app,
        "/api/v1/quiz/prenatal/answers",
        json!({
            "user_id": user_id,
            "question": question["question"],
            "answer": question["answer"],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["correct"], true);
    assert_eq!(body["attempt_number"], 1);
    assert_eq!(body["needs_review"], false);
    assert!(!body["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_incorrect_answer() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("incorrect-user");

    let questions = common::fetch_questions(&app, &user_id, "birth", 3).await;
    let question = &questions[0];

    let (status, body) = common::post_json(
        &app,
        "/api/v1/quiz/birth/answers",
        json!({
            "user_id": user_id,
            "question": question["question"],
            "answer": wrong_option(question),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["correct"], false);
    assert_eq!(body["attempt_number"], 1);
    assert!(!body["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_three_failures_flag_the_question_for_review() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("review-user");

    let questions = common::fetch_questions(&app, &user_id, "postnatal", 2).await;
    let question = &questions[0];
    let wrong = wrong_option(question);

    for attempt in 1..=3 {
        let (status, body) = common::post_json(
            &app,
            "/api/v1/quiz/postnatal/answers",
            json!({
                "user_id": user_id,
                "question": question["question"],
                "answer": wrong,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attempt_number"], attempt);
        if attempt < 3 {
            assert_eq!(body["needs_review"], false);
        } else {
            assert_eq!(body["needs_review"], true);
        }
    }
}

#[tokio::test]
async fn test_answer_for_unserved_question_is_rejected() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("unserved-user");

    // Start a session, then answer a question that was never part of it.
    common::fetch_questions(&app, &user_id, "prenatal", 2).await;

    let (status, _) = common::post_json(
        &app,
        "/api/v1/quiz/prenatal/answers",
        json!({
            "user_id": user_id,
            "question": "Is this question part of the quiz?",
            "answer": "No",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_answer_without_a_session_is_rejected() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("no-session-user");

    let (status, _) = common::post_json(
        &app,
        "/api/v1/quiz/prenatal/answers",
        json!({
            "user_id": user_id,
            "question": "Any question at all",
            "answer": "Anything",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_answer_is_rejected() {
    let app = common::create_test_app().await;
    let user_id = common::unique_user("empty-user");

    let (status, _) = common::post_json(
        &app,
        "/api/v1/quiz/prenatal/answers",
        json!({
            "user_id": user_id,
            "question": "Some question",
            "answer": "",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
