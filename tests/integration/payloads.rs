//! Wire payloads for each facade operation.

use crate::integration::mock_server::MockServerFixture;
use englishapp_api::types::EnglishLevel;
use englishapp_api::Error;
use mockito::Matcher;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_list_topics_maps_photo_url() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json(
            "GET",
            "/topics",
            200,
            r#"{"data":{"topics":[{"id":1,"title":"Travel","description":"Trips and holidays","photo_url":"https://cdn.example.com/travel.jpg"}]}}"#,
            1,
        )
        .await;

    let topics = fixture.client().list_topics().await.unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].title, "Travel");
    assert_eq!(topics[0].image_url, "https://cdn.example.com/travel.jpg");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_session_posts_topic_id() {
    let mut fixture = MockServerFixture::new().await;
    let session_id = Uuid::new_v4();
    let body = json!({
        "data": {
            "session": {
                "id": session_id,
                "topic": {
                    "id": 4,
                    "questions": [
                        {"id": 10, "text": "Where did you go last summer?"},
                        {"id": 11, "text": "What did you enjoy most?"}
                    ]
                }
            }
        }
    });
    let mock = fixture
        .server
        .mock("POST", "/sessions")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"topic_id": 4})))
        .with_status(201)
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await;

    let session = fixture.client().create_session(4).await.unwrap();
    assert_eq!(session.id, session_id);
    assert_eq!(session.topic_questions.id, 4);
    assert_eq!(session.questions().len(), 2);
    assert_eq!(session.questions()[1].id, 11);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_complete_session_decodes_assessment() {
    let mut fixture = MockServerFixture::new().await;
    let session_id = Uuid::new_v4();
    let body = json!({
        "data": {
            "overall_level": "B2",
            "top_words": [{"word": "itinerary", "level": "C1"}],
            "grammar_issues": [{
                "sentence": "I have went there",
                "explanation": "Use the past participle after 'have'.",
                "corrected_sentence": "I have gone there"
            }],
            "rephrase_suggestions": [{"original": "very big", "suggestion": "enormous"}],
            "overall_feedback": "Fluent with minor tense errors."
        }
    });
    let mock = fixture
        .mock_json(
            "POST",
            &format!("/sessions/{}/complete", session_id),
            200,
            &body.to_string(),
            1,
        )
        .await;

    let results = fixture.client().complete_session(session_id).await.unwrap();
    assert_eq!(results.overall_level, EnglishLevel::B2);
    assert_eq!(results.overall_level.description(), "Upper Intermediate");
    assert_eq!(results.top_words[0].text, "itinerary");
    assert_eq!(results.grammar_issues[0].corrected_sentence, "I have gone there");
    assert_eq!(results.rephrase_suggestions[0].suggestion, "enormous");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_article_previews_send_pagination() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/articles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("offset".into(), "40".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"data":{"articles":[{"id":7,"image_url":"https://cdn.example.com/a7.jpg","level":"A2","minutes_to_read":4,"title":"Ordering coffee"}]}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let previews = fixture.client().list_article_previews(20, 40).await.unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].level, EnglishLevel::A2);
    assert_eq!(previews[0].minutes_to_read, 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_article_decodes_vocabulary_and_rules() {
    let mut fixture = MockServerFixture::new().await;
    let body = json!({
        "data": {
            "article": {
                "id": 7,
                "image_url": "https://cdn.example.com/a7.jpg",
                "content": "Could I get a flat white, please?",
                "title": "Ordering coffee",
                "level": "A2",
                "minutes": 4,
                "vocabulary": [{"id": 1, "word": "flat white", "part_of_speech": "noun", "meaning": "espresso with steamed milk"}],
                "rules": [{"id": 2, "name": "Polite requests", "example": "Could I ...?", "note": "Use 'could' to sound polite."}]
            }
        }
    });
    let mock = fixture
        .mock_json("GET", "/articles/7", 200, &body.to_string(), 1)
        .await;

    let article = fixture.client().get_article(7).await.unwrap();
    assert_eq!(article.minutes, 4);
    assert_eq!(article.vocabulary[0].part_of_speech, "noun");
    assert_eq!(article.rules[0].name, "Polite requests");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_schema_mismatch_is_decoding_failure_without_retry() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/topics", 200, r#"{"data":{"topics":"soon"}}"#, 1)
        .await;

    let err = fixture.client().list_topics().await.unwrap_err();
    assert!(matches!(err, Error::DecodingFailed(_)));
    mock.assert_async().await;
}
