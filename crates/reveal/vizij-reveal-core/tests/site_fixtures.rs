use vizij_reveal_core::{
    Config, Easing, HeroDecision, HeroGate, HeroPolicy, ManualSource, MemoryStore, ObserveMode,
    RevealDescriptor, RevealEngine, RevealFamily,
};
use vizij_test_fixtures::{configs, content};

#[test]
fn numbers_section_counts_up_or_shows_labels() {
    let items = content::number_items("site").expect("numbers fixture");
    let mut eng = RevealEngine::new(Config::default(), ManualSource::new(), &false);
    let desc = RevealDescriptor::default().with_threshold(0.5);
    let ids: Vec<_> = items
        .iter()
        .map(|item| eng.observe_count_up(&item.value, &item.unit, desc.clone()).unwrap())
        .collect();

    for id in &ids {
        eng.source_mut().enter(*id, 1.0);
    }
    eng.update(0.0);
    eng.update(1000.0);
    eng.update(2000.0);

    for (item, id) in items.iter().zip(&ids) {
        let shown = eng.count_up_display(*id).unwrap();
        assert_eq!(shown, format!("{}{}", item.value, item.unit), "{}", item.label);
    }
}

#[test]
fn business_rows_alternate_without_reordering() {
    let services = content::records("site", "/business/services").unwrap();
    let mut eng = RevealEngine::new(Config::default(), ManualSource::new(), &false);
    let rows: Vec<_> = services
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let image = RevealFamily::alternating(i);
            let image_id = eng.observe_reveal(RevealDescriptor::new(image)).unwrap();
            let text_id = eng
                .observe_reveal(RevealDescriptor::new(image.mirrored()))
                .unwrap();
            (image_id, text_id)
        })
        .collect();

    assert_eq!(
        eng.token(rows[0].0).as_deref(),
        Some("scroll-slide-left")
    );
    assert_eq!(
        eng.token(rows[1].0).as_deref(),
        Some("scroll-slide-right")
    );
    assert_eq!(
        eng.token(rows[1].1).as_deref(),
        Some("scroll-slide-left")
    );

    // declaration order governs group delays regardless of the zig-zag
    let group = eng
        .observe_group(eng.default_descriptor(), services.len())
        .unwrap();
    assert_eq!(eng.group_delays(group), Some(vec![0, 80, 160, 240]));
}

#[test]
fn config_presets_parse() {
    for key in configs::keys() {
        let text = configs::json(&key).unwrap();
        Config::from_json(&text).unwrap_or_else(|e| panic!("{key}: {e}"));
    }

    let cfg = Config::from_json(&configs::json("always-replay").unwrap()).unwrap();
    assert_eq!(cfg.scroll.family, RevealFamily::FadeIn);
    assert_eq!(cfg.scroll.threshold, 0.15);
    assert_eq!(cfg.count_up.easing, Easing::EaseOutExpo);
    assert_eq!(cfg.hero.policy, HeroPolicy::Always);
    assert_eq!(cfg.hero.storage_key, "intro-seen");

    let cfg = Config::from_json(&configs::json("hero-disabled").unwrap()).unwrap();
    assert_eq!(cfg.scroll.mode, ObserveMode::Repeat);
    assert!(!cfg.hero.enabled);
}

#[test]
fn always_replay_preset_plays_every_load() {
    let cfg = Config::from_json(&configs::json("always-replay").unwrap()).unwrap();
    let mut store = MemoryStore::new();
    for _ in 0..3 {
        let mut gate = HeroGate::new(cfg.hero.clone(), store);
        assert_eq!(gate.resolve(&false), HeroDecision::Play);
        store = gate.into_store();
    }
    assert!(store.is_empty(), "always policy never writes the flag");
}

#[test]
fn start_delay_from_preset_holds_counters() {
    let cfg = Config::from_json(&configs::json("always-replay").unwrap()).unwrap();
    let mut eng = RevealEngine::new(cfg, ManualSource::new(), &false);
    let id = eng
        .observe_count_up("850", "people", RevealDescriptor::default())
        .unwrap();
    eng.source_mut().enter(id, 1.0);
    eng.update(0.0);
    eng.update(150.0);
    assert_eq!(eng.count_up_display(id).as_deref(), Some("0people"));
    eng.update(200.0 + 1500.0);
    assert_eq!(eng.count_up_display(id).as_deref(), Some("850people"));
}
