use super::fake_api::FakeApi;
use crate::client::views::RECENT_REPORTS;
use crate::client::{ClientError, CollectionView, InCategory, ReportsView};
use crate::domain::Category;
use chrono::{TimeZone, Utc};

#[test]
fn map_view_only_holds_records_with_both_coordinates() {
    let api = FakeApi::new();
    api.insert_external("pinned", Category::Water, Some((6.5244, 3.3792)));
    api.insert_external("no fix", Category::Health, None);

    let mut map = CollectionView::map();
    assert!(!map.is_loaded());
    assert_eq!(map.refresh(&api).unwrap(), 1);

    let pins = map.pins();
    assert_eq!(pins.len(), 1);
    assert_eq!(pins[0].name, "pinned");
    assert_eq!((pins[0].lat, pins[0].lng), (6.5244, 3.3792));
    assert_eq!(pins[0].category, Category::Water);
}

#[test]
fn views_disagree_until_each_refreshes() {
    let api = FakeApi::new();
    let mut water = CollectionView::new(InCategory(Category::Water));
    let mut map = CollectionView::map();

    water.refresh(&api).unwrap();
    map.refresh(&api).unwrap();
    api.insert_external("new well", Category::Water, Some((0.3, 32.5)));

    water.refresh(&api).unwrap();
    assert_eq!(water.records().len(), 1);
    assert!(map.records().is_empty());

    map.refresh(&api).unwrap();
    assert_eq!(map.records().len(), 1);
}

#[test]
fn failed_refresh_keeps_last_snapshot() {
    let api = FakeApi::new();
    api.insert_external("kept", Category::Climate, Some((1.0, 1.0)));
    let mut map = CollectionView::map();
    map.refresh(&api).unwrap();

    api.insert_external("unseen", Category::Climate, Some((2.0, 2.0)));
    api.fail_next(ClientError::Network("reset".into()));
    assert!(map.refresh(&api).is_err());

    assert_eq!(map.records().len(), 1);
    assert_eq!(map.records()[0].title, "kept");
    let note = map.take_notification().unwrap();
    assert!(note.is_error());
    assert_eq!(note.description, "Failed to load field data");
    assert!(map.take_notification().is_none());
}

#[test]
fn closures_filter_a_view() {
    let api = FakeApi::new();
    api.insert_external("Borehole 1", Category::Water, None);
    api.insert_external("Clinic", Category::Health, None);

    let mut boreholes = CollectionView::new(|r: &crate::domain::FieldDataRecord| {
        r.title.starts_with("Borehole")
    });
    boreholes.refresh(&api).unwrap();
    assert_eq!(boreholes.records().len(), 1);
}

#[test]
fn reports_totals_cover_every_category() {
    let api = FakeApi::new();
    api.insert_external("w1", Category::Water, None);
    api.insert_external("w2", Category::Water, None);
    api.insert_external("c1", Category::Climate, None);

    let mut reports = ReportsView::new();
    reports.refresh(&api).unwrap();

    let totals: Vec<_> = reports
        .category_totals()
        .into_iter()
        .map(|t| (t.label, t.count))
        .collect();
    assert_eq!(
        totals,
        vec![
            ("Water Quality", 2),
            ("Health Screening", 0),
            ("Climate Monitoring", 1),
            ("Environmental", 0),
        ]
    );
}

#[test]
fn monthly_counts_group_by_calendar_month() {
    let api = FakeApi::new();
    let jan = |d| Utc.with_ymd_and_hms(2026, 1, d, 12, 0, 0).unwrap();
    let feb = |d| Utc.with_ymd_and_hms(2026, 2, d, 12, 0, 0).unwrap();
    api.insert_at("a", Category::Water, jan(3));
    api.insert_at("b", Category::Water, jan(20));
    api.insert_at("c", Category::Health, jan(21));
    api.insert_at("d", Category::Environment, feb(1));

    let mut reports = ReportsView::new();
    reports.refresh(&api).unwrap();
    let months = reports.monthly_counts();

    // list is newest first, so February is seen first
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].label, "Feb");
    assert_eq!(months[0].count(Category::Environment), 1);
    assert_eq!(months[1].label, "Jan");
    assert_eq!(months[1].count(Category::Water), 2);
    assert_eq!(months[1].count(Category::Health), 1);
    assert_eq!(months[1].count(Category::Climate), 0);
}

#[test]
fn search_narrows_the_table_but_not_the_charts() {
    let api = FakeApi::new();
    for i in 0..7 {
        api.insert_external(&format!("Rain gauge {i}"), Category::Climate, None);
    }
    api.insert_external("Clinic intake", Category::Health, None);

    let mut reports = ReportsView::default();
    reports.refresh(&api).unwrap();

    let rows = reports.recent_reports();
    assert_eq!(rows.len(), RECENT_REPORTS);
    assert_eq!(rows[0].title, "Clinic intake");
    assert_eq!(rows[0].kind, "Health");
    assert_eq!(rows[0].status, "Completed");
    assert_eq!(rows[0].date, "2026-03-01");

    reports.set_search("GAUGE");
    let rows = reports.recent_reports();
    assert_eq!(rows.len(), RECENT_REPORTS);
    assert!(rows.iter().all(|r| r.kind == "Climate"));
    assert_eq!(rows[0].title, "Rain gauge 6");

    reports.set_search("clinic");
    assert_eq!(reports.recent_reports().len(), 1);

    let total: usize = reports.category_totals().iter().map(|t| t.count).sum();
    assert_eq!(total, 8);
}
