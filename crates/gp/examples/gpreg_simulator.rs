use golfgp_gp::{design_grid, fit_predict};
use ndarray::{concatenate, Array, Array1, Axis};
use ndarray_npy::write_npy;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

fn simulator(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| (v + 0.1).ln() + (5. * std::f64::consts::PI * v).sin())
}

fn main() {
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let xt = Array1::random_using(10, Uniform::new(0., 1.), &mut rng);
    let noise = Array1::random_using(10, Normal::new(0., 0.1).unwrap(), &mut rng);
    let yt = simulator(&xt) + noise;

    println!("Fit GP regression of noisy 'simulator' at {xt}");
    let xtest = Array::linspace(0., 1., 101);
    let posterior = fit_predict(&xt, &yt, 0.1, 0.1, &xtest).expect("GP regression");
    let (lower, upper) = posterior.confidence_band(2.);

    println!("Posterior (x, true(x), mean(x), mean - 2 std, mean + 2 std)");
    println!(
        "{}",
        concatenate![
            Axis(1),
            xtest.view().insert_axis(Axis(1)),
            simulator(&xtest).insert_axis(Axis(1)),
            posterior.mean().view().insert_axis(Axis(1)),
            lower.insert_axis(Axis(1)),
            upper.insert_axis(Axis(1))
        ]
    );

    // Same regression restricted to the range of training inputs
    let grid = design_grid(&xt, 50).expect("design grid");
    let inside = fit_predict(&xt, &yt, 0.1, 0.1, &grid).expect("GP regression");
    println!(
        "Mean posterior std inside training range: {:.4}",
        inside.std_dev().mean().unwrap_or(0.)
    );

    let test_dir = "target/examples";
    std::fs::create_dir_all(test_dir).ok();
    write_npy(format!("{test_dir}/gpreg_xt.npy"), &xt).expect("xt saved");
    write_npy(format!("{test_dir}/gpreg_yt.npy"), &yt).expect("yt saved");
    write_npy(format!("{test_dir}/gpreg_xtest.npy"), &xtest).expect("xtest saved");
    write_npy(format!("{test_dir}/gpreg_mean.npy"), posterior.mean()).expect("mean saved");
    write_npy(format!("{test_dir}/gpreg_var.npy"), posterior.variance()).expect("var saved");
}
