use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sweetshop_catalog::{Category, Item, ItemFilter, NewItem, Price};
use sweetshop_core::{Entity, ItemId, UserId};
use sweetshop_infra::CatalogService;

fn catalog(size: usize) -> Vec<Item> {
    let t0 = Utc::now();
    (0..size)
        .map(|i| {
            let category = Category::ALL[i % Category::ALL.len()];
            NewItem {
                name: format!("Sweet {i}"),
                description: None,
                category,
                price: Price::new(Decimal::from((i % 1_500) as i64)).unwrap(),
                quantity: 10,
                image_url: None,
            }
            .into_item(ItemId::new(), t0 + Duration::milliseconds(i as i64))
            .unwrap()
        })
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn bench_filter_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_evaluator");

    let filter = ItemFilter::new()
        .with_search("1")
        .with_category(Category::Sweets)
        .with_min_price(Decimal::from(100))
        .with_max_price(Decimal::from(900));

    for size in [100usize, 1_000, 10_000] {
        let items = catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| black_box(filter.apply(items.iter().cloned())))
        });
    }

    group.finish();
}

fn bench_in_memory_purchase(c: &mut Criterion) {
    let rt = runtime();
    let service = CatalogService::in_memory();

    let item = rt
        .block_on(service.create_item(
            NewItem {
                name: "Jalebi".to_string(),
                description: None,
                category: Category::Sweets,
                price: Price::new(Decimal::from(250)).unwrap(),
                quantity: i64::MAX / 2,
                image_url: None,
            },
            Utc::now(),
        ))
        .unwrap();
    let id = *item.id();
    let buyer = UserId::new();

    c.bench_function("in_memory_purchase", |b| {
        b.iter(|| {
            rt.block_on(service.purchase(buyer, id, black_box(1), Utc::now()))
                .unwrap()
        })
    });
}

fn bench_seeded_listing(c: &mut Criterion) {
    let rt = runtime();
    let service = CatalogService::in_memory();
    rt.block_on(service.seed(Utc::now())).unwrap();

    let filter = ItemFilter::new().with_search("ladoo");
    c.bench_function("seeded_catalog_listing", |b| {
        b.iter(|| rt.block_on(service.list_items(black_box(&filter))).unwrap())
    });
}

criterion_group!(
    benches,
    bench_filter_evaluator,
    bench_in_memory_purchase,
    bench_seeded_listing
);
criterion_main!(benches);
