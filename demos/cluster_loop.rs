use kmeans_discretize::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    let (sample_cnt, sample_dims, k, max_iter, n_threads) = (20000, 8, 4, 100, 4);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());

    let kmeans = KMeans::new(KMeansConfig::build().k(k).metric(Metric::Euclidean).input_dimension(sample_dims).build())?;

    // Seed using kmean++, then run Lloyd steps until the centers settle
    let initial = kmeans.init_centers_kmeanplusplus(&samples, 42, n_threads)?;
    let result = kmeans.cluster_loop(&samples, &initial, n_threads, max_iter, 1e-8)?;

    println!("Centers: {:?}", result.centers);
    println!("Iterations: {} ({:?})", result.iterations, result.status);
    println!("Error: {}", kmeans.cost_function(&samples, &result.centers, n_threads)?);
    Ok(())
}
