use chrono::Duration;

use kioku_core::Clock;
use kioku_core::model::{AnswerQuality, ItemCategory, ItemId, LearningItem, ProgressStatus, UserId};
use kioku_core::time::{fixed_clock, fixed_now};
use kioku_services::{AppServices, SessionInput, StudyService};

fn build_item(category: ItemCategory, prompt: &str, position: u32) -> LearningItem {
    LearningItem::new(
        ItemId::random(),
        category,
        prompt,
        "よみ",
        "meaning",
        position,
        fixed_now(),
    )
}

#[tokio::test]
async fn full_study_flow_accrues_schedule_xp_and_streak() {
    let services = AppServices::new_in_memory(fixed_clock());
    let storage = services.storage();
    let user = UserId::random();

    let kana = build_item(ItemCategory::Kana, "あ", 1);
    let vocab = build_item(ItemCategory::Vocabulary, "水", 2);
    let kanji = build_item(ItemCategory::Kanji, "日", 3);
    for item in [&kana, &vocab, &kanji] {
        storage.items.upsert_item(item).await.unwrap();
    }

    // Everything starts in the new-item half of the queue.
    let queue = services.study().build_queue(storage, user, 10).await.unwrap();
    assert!(queue.reviews.is_empty());
    assert_eq!(queue.new_items.len(), 3);
    assert_eq!(queue.new_items[0].id, kana.id);

    // A study day: first exposures pay new-item XP.
    let mut session_xp = 0;
    for item in [&kana, &vocab, &kanji] {
        let outcome = services
            .study()
            .answer_item(storage, user, item.id, AnswerQuality::Good, 2000)
            .await
            .unwrap();
        assert!(outcome.first_exposure);
        assert_eq!(outcome.plan.interval_days, 1);
        session_xp += outcome.xp_earned;
    }
    assert_eq!(session_xp, 30);

    let session = services
        .gamification()
        .complete_session(
            storage,
            user,
            SessionInput {
                duration_secs: 300,
                items_studied: 3,
                items_correct: 3,
                new_items: 3,
                review_items: 0,
                answer_xp: session_xp,
            },
        )
        .await
        .unwrap();
    assert_eq!(session.xp_earned, 30);
    assert!(!session.daily_goal_hit);
    assert_eq!(session.streak.streak, 1);

    let stats = storage.stats.get_stats(user).await.unwrap().unwrap();
    assert_eq!(stats.total_xp, 30);
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.current_streak, 1);

    // The whole batch comes due the next day.
    let next_day = Clock::fixed(fixed_now() + Duration::days(1));
    let study = StudyService::new().with_clock(next_day);
    let queue = study.build_queue(storage, user, 10).await.unwrap();
    assert_eq!(queue.reviews.len(), 3);
    assert!(queue.new_items.is_empty());
}

#[tokio::test]
async fn good_answers_climb_the_ladder_and_a_lapse_resets_it() {
    let services = AppServices::new_in_memory(fixed_clock());
    let storage = services.storage();
    let user = UserId::random();

    let item = build_item(ItemCategory::Vocabulary, "犬", 1);
    storage.items.upsert_item(&item).await.unwrap();

    let mut clock = fixed_clock();
    let mut intervals = Vec::new();
    for _ in 0..3 {
        let study = StudyService::new().with_clock(clock);
        let outcome = study
            .answer_item(storage, user, item.id, AnswerQuality::Good, 2500)
            .await
            .unwrap();
        intervals.push(outcome.plan.interval_days);
        clock.advance(Duration::days(i64::from(outcome.plan.interval_days)));
    }
    assert_eq!(intervals, vec![1, 6, 15]);

    let study = StudyService::new().with_clock(clock);
    let lapse = study
        .answer_item(storage, user, item.id, AnswerQuality::Again, 6000)
        .await
        .unwrap();
    assert_eq!(lapse.plan.interval_days, 1);
    assert_eq!(lapse.plan.repetitions, 0);
    assert_eq!(lapse.progress.status, ProgressStatus::Learning);
    assert!((lapse.plan.ease_factor - 2.3).abs() < 1e-9);
    assert_eq!(lapse.xp_earned, 0);

    let logs = storage.review_logs.logs_for_item(user, item.id).await.unwrap();
    assert_eq!(logs.len(), 4);
    assert_eq!(logs[3].quality, AnswerQuality::Again);
}

#[tokio::test]
async fn queue_puts_the_most_overdue_hardest_items_first() {
    let services = AppServices::new_in_memory(fixed_clock());
    let storage = services.storage();
    let user = UserId::random();

    let easy = build_item(ItemCategory::Vocabulary, "木", 1);
    let hard = build_item(ItemCategory::Kanji, "鬱", 2);
    for item in [&easy, &hard] {
        storage.items.upsert_item(item).await.unwrap();
    }

    // Answer both once so they carry progress, then diverge their schedules.
    for item in [&easy, &hard] {
        services
            .study()
            .answer_item(storage, user, item.id, AnswerQuality::Good, 2000)
            .await
            .unwrap();
    }
    let mut p_easy = storage
        .progress
        .get_progress(user, easy.id)
        .await
        .unwrap()
        .unwrap();
    p_easy.next_review_at = fixed_now() - Duration::days(1);
    storage.progress.upsert_progress(&p_easy).await.unwrap();

    let mut p_hard = storage
        .progress
        .get_progress(user, hard.id)
        .await
        .unwrap()
        .unwrap();
    p_hard.next_review_at = fixed_now() - Duration::days(5);
    p_hard.state.ease_factor = 1.3;
    storage.progress.upsert_progress(&p_hard).await.unwrap();

    let queue = services.study().build_queue(storage, user, 10).await.unwrap();
    assert_eq!(queue.reviews.len(), 2);
    assert_eq!(queue.reviews[0].item.id, hard.id);
    assert_eq!(queue.reviews[1].item.id, easy.id);
}

#[tokio::test]
async fn three_study_days_reach_the_first_streak_milestone() {
    let services = AppServices::new_in_memory(fixed_clock());
    let storage = services.storage();
    let user = UserId::random();

    let mut clock = fixed_clock();
    let mut last = None;
    for _ in 0..3 {
        let gamification = kioku_services::GamificationService::new().with_clock(clock);
        last = Some(
            gamification
                .complete_session(
                    storage,
                    user,
                    SessionInput {
                        duration_secs: 600,
                        items_studied: 20,
                        items_correct: 17,
                        new_items: 5,
                        review_items: 15,
                        answer_xp: 100,
                    },
                )
                .await
                .unwrap(),
        );
        clock.advance(Duration::days(1));
    }

    let last = last.unwrap();
    assert_eq!(last.streak.streak, 3);
    // 100 answer XP + 50 goal bonus + 50 milestone bonus.
    assert_eq!(last.xp_earned, 200);

    let stats = storage.stats.get_stats(user).await.unwrap().unwrap();
    assert_eq!(stats.current_streak, 3);
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.total_xp, 150 + 150 + 200);
    // 500 XP clears levels 2 (150) and 3 (225).
    assert_eq!(stats.level, 3);
}
