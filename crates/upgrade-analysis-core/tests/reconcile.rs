//! Integration tests for snapshot reconciliation.

use upgrade_analysis_core::{
    reconcile, reconcile_with, AnalysisReport, AprioriMap, ChangeKind, ConfigurationError,
    FieldRecord, Identity, ModelRecord, ReconcileOptions, XmlIdRecord, GENERAL,
};

fn empty_apriori() -> AprioriMap {
    AprioriMap::from_json_str(
        r#"{"renamed_modules": {}, "merged_modules": {}, "renamed_models": {}, "merged_models": {}}"#,
    )
    .unwrap()
}

fn sample_fields() -> Vec<FieldRecord> {
    vec![
        FieldRecord::new("sale", "sale.order", "note", "text"),
        FieldRecord::new("sale", "sale.order", "partner_id", "many2one").with_relation("res.partner"),
        FieldRecord::new("account", "account.move", "ref", "char").required(),
        FieldRecord::new("stock", "stock.picking", "amount", "monetary").computed(),
    ]
}

#[test]
fn test_identical_records_emit_nothing() {
    let fields = sample_fields();
    let report = reconcile(&fields, &fields.clone(), None);
    assert!(report.is_empty(), "unexpected entries: {:?}", report.changes);
    assert_eq!(report.stats.unchanged, fields.len());
    assert!(report.stats.is_balanced());
}

#[test]
fn test_reconcile_is_idempotent_for_every_family() {
    let models = vec![
        ModelRecord::new("sale", "sale.order"),
        ModelRecord::new("sale", "sale.order.line").with_label("Sales Order Line"),
    ];
    let xmlids = vec![
        XmlIdRecord::new("sale", "ir.ui.view", "sale.view_order_form"),
        XmlIdRecord::new("sale", "ir.rule", "sale.sale_order_personal_rule").noupdate(),
    ];
    let apriori = empty_apriori();
    assert!(reconcile(&models, &models, Some(&apriori)).is_empty());
    assert!(reconcile(&xmlids, &xmlids, Some(&apriori)).is_empty());
    assert!(reconcile(&sample_fields(), &sample_fields(), Some(&apriori)).is_empty());
}

#[test]
fn test_reconcile_is_idempotent_under_renames_and_merges() {
    let apriori = empty_apriori()
        .with_renamed_model("sale.order.line", "sale.line")
        .with_merged_module("sale_margin", "sale")
        .with_merged_model("account.invoice", "account.move");
    let fields = vec![
        FieldRecord::new("sale", "sale.order.line", "price", "float"),
        FieldRecord::new("sale_margin", "sale.order", "margin", "float"),
        FieldRecord::new("account", "account.invoice", "ref", "char"),
        FieldRecord::new("sale", "sale.order", "note", "text"),
    ];
    let models = vec![
        ModelRecord::new("sale", "sale.order.line"),
        ModelRecord::new("account", "account.invoice"),
    ];

    let report = reconcile(&fields, &fields.clone(), Some(&apriori));
    assert!(report.is_empty(), "identical fields produced entries: {:?}", report.changes);
    assert_eq!(report.stats.unchanged, fields.len());
    assert!(report.stats.is_balanced());

    let report = reconcile(&models, &models.clone(), Some(&apriori));
    assert!(report.is_empty(), "identical models produced entries: {:?}", report.changes);
}

#[test]
fn test_raw_fallback_reports_attribute_change() {
    let apriori = empty_apriori().with_renamed_model("sale.order.line", "sale.line");
    let remote = vec![FieldRecord::new("sale", "sale.order.line", "price", "float")];
    let local = vec![FieldRecord::new("sale", "sale.order.line", "price", "monetary")];

    let report = reconcile(&remote, &local, Some(&apriori));
    let entries = report.entries("sale");
    assert_eq!(entries.len(), 1, "got {entries:?}");
    assert_eq!(entries[0].kind, ChangeKind::Changed);
    assert_eq!(entries[0].after, Identity::new("sale", "sale.order.line", "price"));
    assert_eq!(report.stats.changed, 1);
    assert_eq!(report.stats.added + report.stats.removed, 0);
}

#[test]
fn test_entries_within_a_module_are_ordered() {
    let apriori = empty_apriori().with_merged_module("sale_margin", "sale");
    let remote = vec![
        FieldRecord::new("sale", "sale.order", "zeta", "text"),
        FieldRecord::new("sale", "sale.order", "margin", "float"),
        FieldRecord::new("sale", "sale.order", "alpha", "text"),
        FieldRecord::new("sale_margin", "sale.order", "margin", "float"),
    ];
    let local = vec![
        FieldRecord::new("sale", "sale.order", "margin", "monetary"),
        FieldRecord::new("sale", "sale.order", "beta", "char"),
        FieldRecord::new("sale", "sale.order", "alpha", "html"),
        FieldRecord::new("sale", "res.partner", "x", "char"),
    ];

    let report = reconcile(&remote, &local, Some(&apriori));
    let lines: Vec<String> = report.entries("sale").iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        [
            "sale         / res.partner              / x: NEW type: char",
            "sale         / sale.order               / alpha: type is now 'html' ('text')",
            "sale         / sale.order               / beta: NEW type: char",
            "sale         / sale.order               / margin: merged from \
             sale_margin / sale.order / margin, type is now 'monetary' ('float')",
            "sale         / sale.order               / margin: type is now 'monetary' ('float')",
            "sale         / sale.order               / zeta: DEL type: text",
        ]
    );
}

#[test]
fn test_remote_only_record_is_removed_with_raw_identity() {
    let remote = vec![FieldRecord::new("sale", "sale.order", "note", "text")];
    let report = reconcile(&remote, &[], Some(&empty_apriori()));

    assert_eq!(report.modules().collect::<Vec<_>>(), ["sale"]);
    let entries = report.entries("sale");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ChangeKind::Removed);
    assert_eq!(entries[0].before, Identity::new("sale", "sale.order", "note"));
    assert_eq!(report.stats.removed, 1);
}

#[test]
fn test_local_only_record_is_added_with_raw_identity() {
    let local = vec![FieldRecord::new("sale", "sale.order", "margin", "float")];
    let report = reconcile(&[], &local, None);

    let entries = report.entries("sale");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ChangeKind::Added);
    assert_eq!(entries[0].before, Identity::new("sale", "sale.order", "margin"));
    assert_eq!(entries[0].after, entries[0].before);
    assert_eq!(
        entries[0].to_string(),
        "sale         / sale.order               / margin: NEW type: float"
    );
}

#[test]
fn test_model_rename_yields_single_renamed_entry() {
    let apriori = empty_apriori().with_renamed_model("sale.order.line", "sale.line");
    let remote = vec![FieldRecord::new("sale", "sale.order.line", "price", "float")];
    let local = vec![FieldRecord::new("sale", "sale.line", "price", "monetary")];

    let report = reconcile(&remote, &local, Some(&apriori));
    let entries = report.entries("sale");
    assert_eq!(entries.len(), 1, "got {entries:?}");
    assert_eq!(entries[0].kind, ChangeKind::Renamed);
    assert_eq!(
        entries[0].to_string(),
        "sale         / sale.line                / price: renamed from \
         sale / sale.order.line / price, type is now 'monetary' ('float')"
    );
    assert_eq!(report.stats.added, 0);
    assert_eq!(report.stats.removed, 0);
    assert_eq!(report.stats.remapped, 1);
}

#[test]
fn test_module_and_model_merge_compose_into_one_entry() {
    let apriori = empty_apriori()
        .with_merged_module("a", "b")
        .with_merged_model("x", "y");
    let remote = vec![FieldRecord::new("a", "x", "f", "char")];
    let local = vec![FieldRecord::new("b", "y", "f", "char")];

    let report = reconcile(&remote, &local, Some(&apriori));
    assert!(report.entries("a").is_empty());
    let entries = report.entries("b");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ChangeKind::Merged);
    assert_eq!(entries[0].owner(), "b");
    assert!(report.stats.is_balanced());
}

#[test]
fn test_attribute_change_is_reported_as_changed() {
    let remote = vec![FieldRecord::new("sale", "sale.order", "note", "text")];
    let local = vec![FieldRecord::new("sale", "sale.order", "note", "html").required()];

    let report = reconcile(&remote, &local, None);
    let entries = report.entries("sale");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ChangeKind::Changed);
    assert_eq!(
        entries[0].detail.as_deref(),
        Some("type is now 'html' ('text'), now required")
    );
}

#[test]
fn test_module_merge_lets_two_remote_records_share_one_local() {
    let apriori = empty_apriori().with_merged_module("sale_margin", "sale");
    let remote = vec![
        FieldRecord::new("sale", "sale.order", "margin", "float"),
        FieldRecord::new("sale_margin", "sale.order", "margin", "float"),
    ];
    let local = vec![FieldRecord::new("sale", "sale.order", "margin", "float")];

    let report = reconcile(&remote, &local, Some(&apriori));
    assert_eq!(report.stats.unchanged, 1);
    assert_eq!(report.stats.remapped, 1);
    assert_eq!(report.stats.shared_local, 1);
    assert_eq!(report.stats.added, 0);
    assert!(report.stats.is_balanced());
}

#[test]
fn test_duplicates_and_ignored_names_are_accounted() {
    let remote = vec![
        FieldRecord::new("sale", "sale.order", "note", "text"),
        FieldRecord::new("sale", "sale.order", "note", "html"),
        FieldRecord::new("sale", "sale.order", "write_uid", "many2one"),
    ];
    let local = vec![FieldRecord::new("sale", "sale.order", "note", "text")];

    let report = reconcile_with(&remote, &local, None, &ReconcileOptions::ignoring(["write_uid"]));
    assert!(report.entries("sale").is_empty());
    let general: Vec<String> = report.entries(GENERAL).iter().map(ToString::to_string).collect();
    assert_eq!(
        general,
        ["duplicate field record sale / sale.order / note in remote snapshot not compared"]
    );
    assert_eq!(report.stats.duplicate_remote, 1);
    assert_eq!(report.stats.ignored_remote, 1);
    assert!(report.stats.is_balanced());
}

#[test]
fn test_new_model_is_cross_referenced_in_general() {
    let local = vec![ModelRecord::new("sale", "sale.line")];
    let report = reconcile(&[], &local, None);

    let general: Vec<String> = report.entries(GENERAL).iter().map(ToString::to_string).collect();
    assert_eq!(general, ["new model sale.line [module sale]"]);
    assert_eq!(report.entries("sale")[0].kind, ChangeKind::Added);
    assert_eq!(report.stats.added, 1);
}

#[test]
fn test_renamed_model_notes_obsolete_name() {
    let apriori = empty_apriori().with_renamed_model("sale.order.line", "sale.line");
    let remote = vec![ModelRecord::new("sale", "sale.order.line")];
    let local = vec![ModelRecord::new("sale", "sale.line")];

    let report = reconcile(&remote, &local, Some(&apriori));
    let general: Vec<String> = report.entries(GENERAL).iter().map(ToString::to_string).collect();
    assert_eq!(
        general,
        ["obsolete model sale.order.line (renamed to sale.line) [module sale]"]
    );
}

#[test]
fn test_xmlid_noupdate_flip() {
    let remote = vec![XmlIdRecord::new("sale", "ir.rule", "sale.personal_rule")];
    let local = vec![XmlIdRecord::new("sale", "ir.rule", "sale.personal_rule").noupdate()];

    let report = reconcile(&remote, &local, None);
    let entries = report.entries("sale");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].detail.as_deref(), Some("now noupdate"));
}

#[test]
fn test_sale_order_scenario_renders_removed_note() {
    let apriori = empty_apriori();
    let remote = vec![FieldRecord::new("sale", "sale.order", "note", "text")];
    let no_models: &[ModelRecord] = &[];
    let no_xmlids: &[XmlIdRecord] = &[];
    let report = AnalysisReport {
        fields: reconcile(&remote, &[], Some(&apriori)),
        models: reconcile(no_models, no_models, Some(&apriori)),
        xmlids: reconcile(no_xmlids, no_xmlids, Some(&apriori)),
    };

    assert_eq!(report.fields.changes.len(), 1);
    assert!(report
        .render_module("sale")
        .contains("sale         / sale.order               / note: DEL type: text\n"));
}

#[test]
fn test_missing_merged_models_key_is_named() {
    let err = AprioriMap::from_json_str(
        r#"{"renamed_modules": {}, "merged_modules": {}, "renamed_models": {}}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::MissingAprioriKey {
            key: "merged_models"
        }
    ));
    assert_eq!(
        err.to_string(),
        "invalid contents of apriori.json: no key 'merged_models'"
    );
}
