//! Benchmarks for the pagination engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quire::document::ChapterFlags;
use quire::layout::{compose_page, MetricsMeasure, PageSlot, PaginationState};
use quire::{Book, Chapter, LayoutEngine, Project, Theme};

fn chapter(title: &str, paragraphs: usize) -> Chapter {
    let body: Vec<String> = (0..paragraphs)
        .map(|i| {
            format!(
                "Paragraph {} contains *enough* text to span multiple lines and test the **page fitting** search. \
                 It keeps going for a while so that paragraphs split across pages.",
                i
            )
        })
        .collect();
    Chapter::new(title, body.join("\n\n"))
}

fn novel(chapters: usize) -> Project {
    let toc = ChapterFlags {
        is_table_of_contents: true,
        ..ChapterFlags::default()
    };
    let mut all = vec![Chapter::new("Contents", "").with_flags(toc)];
    all.extend((0..chapters).map(|i| chapter(&format!("Chapter {}", i + 1), 40)));
    Project {
        chapters: all,
        ..Project::default()
    }
}

fn bench_compose_single_page(c: &mut Criterion) {
    c.bench_function("compose_single_page", |b| {
        let theme = Theme::default();
        let measure = MetricsMeasure::default();
        let chapter = chapter("Opening", 20);
        let paragraphs = chapter.paragraphs();
        let slot = PageSlot::for_theme(&theme, 1, true);

        b.iter(|| {
            black_box(
                compose_page(
                    &chapter,
                    &paragraphs,
                    &theme,
                    slot,
                    PaginationState::default(),
                    &measure,
                )
                .unwrap(),
            );
        });
    });
}

fn bench_paginate_chapter(c: &mut Criterion) {
    c.bench_function("paginate_long_chapter", |b| {
        let engine = LayoutEngine::new(Theme::default());
        let project = Project {
            chapters: vec![chapter("Long", 200)],
            ..Project::default()
        };

        b.iter(|| {
            black_box(engine.paginate(&project).unwrap());
        });
    });
}

fn bench_generate_with_toc(c: &mut Criterion) {
    c.bench_function("generate_novel_with_toc", |b| {
        let theme = Theme {
            drop_caps: true,
            lead_with_small_caps: true,
            ..Theme::default()
        };
        let book = Book::new(novel(12), theme);

        b.iter(|| {
            black_box(book.generate().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_compose_single_page,
    bench_paginate_chapter,
    bench_generate_with_toc,
);

criterion_main!(benches);
