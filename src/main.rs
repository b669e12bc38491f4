// Trains a linear scorer on synthetic pairs through a ranking loss layer.
// Usage:
//   ferrite-rank [layer_spec.json] [scorer_out.json]
// Without a layer spec file a RankingLoss with margin 0.3 is used.
use std::process::ExitCode;

use rand::Rng;

use ferrite_rank::{
    LinearScorer, LossLayerSpec, LossType, PairDataset, RankingLossParam, Sgd, TrainConfig,
    train_pairs,
};

const INPUT_SIZE: usize = 4;
const PAIRS: usize = 512;

fn synthetic_pairs(hidden: &[f64], reference_scale: f64) -> ferrite_rank::Result<PairDataset> {
    let mut rng = rand::thread_rng();
    let mut sample = || -> Vec<f64> { (0..hidden.len()).map(|_| rng.gen_range(-1.0..1.0)).collect() };
    let left: Vec<Vec<f64>> = (0..PAIRS).map(|_| sample()).collect();
    let right: Vec<Vec<f64>> = (0..PAIRS).map(|_| sample()).collect();
    let truth = |x: &Vec<f64>| reference_scale * x.iter().zip(hidden).map(|(a, w)| a * w).sum::<f64>();
    let left_ref = left.iter().map(truth).collect();
    let right_ref = right.iter().map(truth).collect();
    PairDataset::new(left, right, left_ref, right_ref)
}

fn run() -> ferrite_rank::Result<()> {
    let mut args = std::env::args().skip(1);
    let spec = match args.next() {
        Some(path) => LossLayerSpec::load_json(&path)?,
        None => LossLayerSpec::new("rank", LossType::RankingLoss, RankingLossParam::new(0.3)),
    };
    let mut layer = spec.build()?;

    // Both layers learn the left-above-right direction only. RealRankingLoss
    // also needs reference gaps of 80 or more to register a pair.
    let hidden = [1.5, -2.0, 0.5, 1.0];
    let data = match spec.layer_type {
        LossType::RankingLoss => synthetic_pairs(&hidden, 1.0)?.oriented(),
        LossType::RealRankingLoss => synthetic_pairs(&hidden, 400.0)?.oriented(),
    };

    let mut scorer = LinearScorer::random(INPUT_SIZE);
    let optimizer = Sgd::new(0.05);
    let (tx, rx) = std::sync::mpsc::channel();
    let mut config = TrainConfig::new(30, 32);
    config.progress_tx = Some(tx);

    println!("ferrite-rank: training '{}' ({})", spec.name, layer.type_name());
    let final_loss = train_pairs(&mut scorer, &data, layer.as_mut(), &optimizer, &config)?;
    drop(config);
    for stats in rx.iter() {
        println!(
            "Epoch {:>3}/{}: loss = {:.6}, pair accuracy = {:.3} ({} ms)",
            stats.epoch, stats.total_epochs, stats.train_loss, stats.pair_accuracy, stats.elapsed_ms
        );
    }
    println!("Final loss: {final_loss:.6}");
    println!("Learned weights: {:?}", scorer.weights);
    if let Some(out) = args.next() {
        scorer.save_json(&out)?;
        println!("Scorer saved to {out}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("ferrite-rank: {e}");
            ExitCode::FAILURE
        }
    }
}
