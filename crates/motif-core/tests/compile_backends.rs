//! Fixture-driven compiler backend tests.

use motif_core::schema::Document;
use motif_core::{compile_component, compile_stylesheet, CompileOptions};
use motif_test_fixtures as fixtures;

fn load(name: &str) -> Document {
    fixtures::documents::load(name).expect("fixture should load")
}

/// it should map a ratio-0.25 spring to the strong-overshoot bezier
#[test]
fn card_hover_spring_overshoots() {
    let doc = load("card-intro");
    let art = compile_stylesheet(&doc, &CompileOptions::default());
    assert!(art.code.contains(".card:hover"));
    assert!(art.code.contains("cubic-bezier(0.175, 0.885, 0.32, 1.275)"));
    // The hover state lifts the card and casts a shadow.
    assert!(art.code.contains("box-shadow:"));
}

#[test]
fn stylesheet_base_rules_come_from_initial() {
    let doc = load("card-intro");
    let art = compile_stylesheet(&doc, &CompileOptions::default());
    assert!(art.code.contains(".card {"));
    assert!(art.code.contains("opacity: 0;"));
    assert!(art.code.contains("background-color: #4f46e5;"));
    assert!(art.code.contains("border-radius: 12px;"));
    // Resolved expressions: x = ${slide * 2}, y = $theme.pad.
    assert!(art.code.contains("transform: translateX(48px) translateY(16px);"));
}

/// it should warn about triggers CSS cannot express
#[test]
fn stylesheet_warns_on_in_view() {
    let doc = load("dashboard");
    let art = compile_stylesheet(&doc, &CompileOptions::default());
    assert!(art
        .warnings
        .iter()
        .any(|w| w.feature == "trigger:inView" && w.path == "timeline.sequences[1].trigger"));
}

#[test]
fn stylesheet_emits_keyframes_for_pulse() {
    let doc = load("pulse-loop");
    let art = compile_stylesheet(&doc, &CompileOptions::default());
    assert!(art.code.contains("@keyframes dot-pulse"));
    assert!(art.code.contains("60% {"));
    assert!(art.code.contains("infinite alternate"));
    assert!(art.warnings.is_empty());
}

/// it should declare animation controls only when orchestration needs them
#[test]
fn component_controls_iff_group_or_repeat() {
    let plain = compile_component(&load("card-intro"), &CompileOptions::default());
    assert!(!plain.code.contains("useAnimationControls"));
    assert!(plain.code.contains("whileHover="));
    assert!(plain.code.contains("animate={{ y: 0, opacity: 1 }}"));

    let grouped = compile_component(&load("dashboard"), &CompileOptions::default());
    assert!(grouped.code.contains("useAnimationControls"));
    assert!(grouped.code.contains("await Promise.all(["));

    let repeated = compile_component(&load("pulse-loop"), &CompileOptions::default());
    assert!(repeated.code.contains("useAnimationControls"));
    assert!(repeated.code.contains("for (;;) {"));
}

#[test]
fn component_manifest_and_language() {
    let art = compile_component(&load("card-intro"), &CompileOptions::default());
    assert_eq!(art.language, "tsx");
    assert!(art
        .dependencies
        .iter()
        .any(|(name, range)| name == "framer-motion" && range.starts_with('^')));
    assert!(art.code.contains("import { motion } from \"framer-motion\";"));
    assert!(art.code.contains("export function AnimatedScene()"));
}

#[test]
fn component_name_option_is_honored() {
    let options = CompileOptions {
        component_name: "CardIntro".to_string(),
        ..CompileOptions::default()
    };
    let art = compile_component(&load("card-intro"), &options);
    assert!(art.code.contains("export function CardIntro()"));
}
