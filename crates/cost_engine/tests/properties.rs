use cost_engine::estimate::{forward_flops, kv_cache_bytes, total_parameters};
use cost_engine::{ArchitectureFamily, Preset, RawArchitecture};

fn with(preset: Preset, edit: impl Fn(&mut RawArchitecture)) -> RawArchitecture {
    let mut raw = preset.raw();
    edit(&mut raw);
    raw
}

#[test]
fn test_parameters_positive_and_monotonic_in_layers() -> anyhow::Result<()> {
    for preset in Preset::ALL {
        let mut previous = 0;
        for layers in 1..=24 {
            let config = with(preset, |r| r.num_layers = Some(layers)).resolve()?;
            let params = total_parameters(&config);
            assert!(params > 0, "{} has no parameters", preset.name());
            assert!(params >= previous, "{} shrank at {} layers", preset.name(), layers);
            previous = params;
        }
    }
    Ok(())
}

#[test]
fn test_gqa_with_all_groups_matches_dense() -> anyhow::Result<()> {
    let dense = Preset::Gpt2Small.config()?;
    let gqa = with(Preset::Gpt2Small, |r| {
        r.family = Some(ArchitectureFamily::GroupedQuery);
        r.num_kv_groups = Some(12);
    })
    .resolve()?;

    assert_eq!(total_parameters(&gqa), total_parameters(&dense));
    assert_eq!(forward_flops(&gqa), forward_flops(&dense));
    assert_eq!(kv_cache_bytes(&gqa), kv_cache_bytes(&dense));
    Ok(())
}

#[test]
fn test_kv_cache_scales_linearly() -> anyhow::Result<()> {
    for preset in Preset::ALL {
        let base = preset.config()?;
        let base_bytes = kv_cache_bytes(&base);

        let longer = with(preset, |r| r.sequence_length = Some(2048)).resolve()?;
        let deeper = with(preset, |r| r.num_layers = Some(24)).resolve()?;
        let wider = with(preset, |r| r.bytes_per_element = Some(4)).resolve()?;

        assert_eq!(kv_cache_bytes(&longer), 2 * base_bytes, "{}", preset.name());
        assert_eq!(kv_cache_bytes(&deeper), 2 * base_bytes, "{}", preset.name());
        assert_eq!(kv_cache_bytes(&wider), 2 * base_bytes, "{}", preset.name());
    }
    Ok(())
}

#[test]
fn test_flops_ignore_storage_width() -> anyhow::Result<()> {
    for preset in Preset::ALL {
        let base = forward_flops(&preset.config()?);
        for bytes in [1, 4, 8] {
            let config = with(preset, |r| r.bytes_per_element = Some(bytes)).resolve()?;
            assert_eq!(forward_flops(&config), base, "{}", preset.name());
        }
    }
    Ok(())
}

#[test]
fn test_estimates_are_deterministic() -> anyhow::Result<()> {
    for preset in Preset::ALL {
        let config = preset.config()?;
        assert_eq!(
            cost_engine::CostEstimate::of(&config),
            cost_engine::CostEstimate::of(&config)
        );
    }
    Ok(())
}

#[test]
fn test_invalid_configuration_names_field() {
    let raw = with(Preset::StateSpaceSmall, |r| r.expansion_ratio = Some(0));
    let err = raw.resolve().unwrap_err();
    assert_eq!(err.field(), "expansion_ratio");

    let raw = with(Preset::GatedLinearSmall, |r| r.key_dim = None);
    assert_eq!(raw.resolve().unwrap_err().field(), "key_dim");
}

#[test]
fn test_extreme_dimensions_never_reach_estimators() -> anyhow::Result<()> {
    let raw = with(Preset::StateSpaceSmall, |r| {
        r.sequence_length = Some(8_388_608);
        r.hidden_dim = Some(65_536);
    });
    assert_eq!(raw.resolve().unwrap_err().field(), "sequence_length");

    let raw = with(Preset::Gpt2Small, |r| r.vocab_size = Some(i64::MAX));
    assert_eq!(raw.resolve().unwrap_err().field(), "vocab_size");

    // Large but representable: resolves and estimates exactly.
    let config = with(Preset::Gpt2Small, |r| {
        r.sequence_length = Some(131_072);
        r.hidden_dim = Some(16_384);
        r.num_layers = Some(128);
    })
    .resolve()?;
    let estimate = cost_engine::CostEstimate::of(&config);
    assert_eq!(cost_engine::CostEstimate::checked(&config), Some(estimate));
    assert!(estimate.forward_flops < u64::MAX);
    Ok(())
}
