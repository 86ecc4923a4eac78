use nbox::{BoxConfig, BoxSlice, ElementType, NdBox};

fn main() -> nbox::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = BoxConfig {
        seed: Some(727),
        ..Default::default()
    }
    .build()?;

    // 5x5 grid of 0..25 against the same values reversed
    let values: Vec<i32> = (0..25).collect();
    let grid = NdBox::from_slice(&[5, 5], &values)?;
    let reversed: Vec<f64> = values.iter().rev().map(|v| *v as f64).collect();
    let other = NdBox::from_slice(&[5, 5], &reversed)?;

    let count_true = |b: &NdBox| -> nbox::Result<usize> {
        Ok(b.to_vec::<bool>()?.into_iter().filter(|v| *v).count())
    };
    let equal = count_true(&grid.eq(&other)?)?;
    let below = count_true(&grid.lt(&other)?)?;
    tracing::info!(equal, below, "compared grid against its reverse");

    // Walk the odd rows back to front
    let mut picked = Vec::new();
    grid.for_each(
        &[BoxSlice::range(1, 5).with_step(2), BoxSlice::all().with_step(-1)],
        |offset| picked.push(offset),
    )?;
    tracing::info!(?picked, "odd rows reversed");

    let corner = grid.slice_text("::-2, 3:")?;
    tracing::info!(
        dims = ?corner.dims(),
        values = ?corner.to_vec::<i32>()?,
        "sliced from text"
    );

    let noise = NdBox::random_uniform(ElementType::Float32, &[2, 3], 0.0, 1.0, &config)?;
    let truncated = noise.clone_as(ElementType::UInt8)?.to_vec::<u8>()?;
    let noise = noise.to_vec::<f32>()?;
    tracing::info!(?noise, ?truncated, "random fill");

    let mut resized = grid.try_clone()?;
    let block = resized.data_ptr();
    resized.reshape(&[2, 2])?;
    tracing::info!(
        dims = ?resized.dims(),
        capacity = resized.data_capacity_bytes(),
        same_block = std::ptr::eq(resized.data_ptr(), block),
        "shrunk clone keeps its block"
    );

    Ok(())
}
