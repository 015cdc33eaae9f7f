//! Criterion benchmarks for quest list derivation and envelope decoding.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use questline::models::{AppData, Quest, QuestStatus, QuestType, Step, UserState, new_id};
use questline::state::{QuestCommand, QuestViews, reducer};
use questline::storage::{decode_app_data, encode_app_data};

const NOW: i64 = 1_700_000_000_000;

fn make_quests(count: usize) -> Vec<Quest> {
    (0..count)
        .map(|i| {
            let status = QuestStatus::ALL[i % QuestStatus::ALL.len()];
            let quest_type = if i % 5 == 0 { QuestType::Main } else { QuestType::Side };
            Quest {
                id: new_id(),
                title: format!("Quest {i}"),
                description: "Bench quest".to_string(),
                quest_type,
                status,
                created_at: NOW,
                updated_at: NOW,
                completed_at: (status == QuestStatus::Completed).then_some(NOW),
                steps: (0..4).map(|s| Step::new(format!("Step {s}"))).collect(),
                reward: None,
                xp_value: questline::services::xp::quest_xp_value(quest_type),
            }
        })
        .collect()
}

fn bench_views(c: &mut Criterion) {
    let quests = make_quests(1000);

    c.bench_function("quest_views_1000", |b| {
        b.iter(|| QuestViews::from_quests(black_box(&quests)))
    });
}

fn bench_toggle_step(c: &mut Criterion) {
    let quests = make_quests(1000);
    let target = &quests[500];
    let (quest_id, step_id) = (target.id.clone(), target.steps[0].id.clone());

    c.bench_function("reducer_toggle_step_1000", |b| {
        b.iter(|| {
            reducer::apply(
                black_box(&quests),
                QuestCommand::ToggleStep {
                    quest_id: quest_id.clone(),
                    step_id: step_id.clone(),
                },
                NOW,
            )
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let data = AppData::from_parts(UserState::default(), make_quests(200));
    let raw = encode_app_data(&data).unwrap();

    c.bench_function("decode_app_data_200", |b| {
        b.iter(|| decode_app_data(black_box(&raw)))
    });
}

criterion_group!(benches, bench_views, bench_toggle_step, bench_decode);
criterion_main!(benches);
