use vantage_core::market::{CompetitorAnalyzer, Difficulty, KeywordSimulator};

#[test]
fn test_cpc_non_decreasing_in_word_count() {
    let keywords = [
        "curso",
        "curso online",
        "curso online de",
        "curso online de inglês",
        "curso online de inglês avançado",
    ];

    let cpcs: Vec<f64> = keywords.iter().map(|k| KeywordSimulator::metrics(k).cpc).collect();
    assert!(cpcs.windows(2).all(|pair| pair[0] <= pair[1]), "{:?}", cpcs);
}

#[test]
fn test_cpc_bumped_for_high_value_niches() {
    for (plain, niche) in [
        ("curso online", "marketing online"),
        ("dicas rápidas", "saúde rápida"),
        ("aulas de violão", "educação de violão"),
        ("planilha pessoal", "finanças pessoais"),
        ("guia completo", "investimento completo"),
    ] {
        let base = KeywordSimulator::metrics(plain);
        let bumped = KeywordSimulator::metrics(niche);
        assert!(bumped.cpc > base.cpc, "{} vs {}", niche, plain);
    }
}

#[test]
fn test_volume_and_difficulty() {
    let short = KeywordSimulator::metrics("pilates");
    assert_eq!(short.volume, 10_000);
    assert_eq!(short.difficulty, Difficulty::Alta);

    let long = KeywordSimulator::metrics("aulas de pilates para iniciantes em casa");
    assert_eq!(long.volume, 50_000);
    assert_eq!(long.difficulty, Difficulty::Baixa);
}

#[tokio::test]
async fn test_empty_competitors_yield_two_complete_profiles() {
    let analyzer = CompetitorAnalyzer::new(None, 3, 5);

    for text in ["", "   ", ", ,"] {
        let profiles = analyzer.analyze("saúde", text, "").await.into_inner();
        assert_eq!(profiles.len(), 2);
        for profile in &profiles {
            assert!(!profile.forcas.is_empty());
            assert!(!profile.fraquezas.is_empty());
        }
    }
}

#[tokio::test]
async fn test_profile_count_matches_named_competitors() {
    let analyzer = CompetitorAnalyzer::new(None, 3, 5);

    for (text, expected) in [("A", 1), ("A, B", 2), (" A ,, B , C ", 3), ("A,B,C,D,", 4)] {
        let profiles = analyzer.analyze("fitness", text, "Treino").await.into_inner();
        assert_eq!(profiles.len(), expected, "for {:?}", text);
        assert!(profiles.iter().all(|p| !p.forcas.is_empty() && !p.fraquezas.is_empty()));
    }
}
