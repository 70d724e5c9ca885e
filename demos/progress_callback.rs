use kmeans_discretize::*;
use std::cell::Cell;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 200, 4, 2500);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());

    // Stop after 10 iterations, no matter whether the loop converged
    let budget = Cell::new(10usize);
    let progress = |nr: usize| -> std::result::Result<(), CallbackError> {
        println!("Iteration {} done", nr);
        budget.set(budget.get().saturating_sub(1));
        if budget.get() == 0 { Err("iteration budget of the caller used up".into()) } else { Ok(()) }
    };

    let mut kmeans = KMeans::new(KMeansConfig::build()
        .k(k)
        .input_dimension(sample_dims)
        .progress_callback(&progress)
        .build())?;

    let initial = kmeans.init_centers_random_sample(&samples, 7)?;
    match kmeans.cluster_loop(&samples, &initial, 4, max_iter, 1e-6) {
        Err(KMeansError::CallbackFailure(e)) => println!("Aborted: {}", e),
        other => println!("Finished: {:?}", other.map(|r| r.iterations)),
    }

    // Without a callback, the loop runs until convergence
    kmeans.set_callback(None);
    let result = kmeans.cluster_loop(&samples, &initial, 4, max_iter, 1e-6)?;
    println!("Iterations: {} ({:?})", result.iterations, result.status);
    Ok(())
}
