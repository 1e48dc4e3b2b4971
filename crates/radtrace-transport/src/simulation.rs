//! The transport loop.

use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use radtrace_optics::{Coating, RadiationPackage};
use radtrace_scene::{Navigator, Scene, Transition, VolumeId};

use crate::interactor::{MaterialInteractor, WallInteractor, WallOutcome};
use crate::{
    Emitter, Facing, Medium, ReceiverStats, Result, Tally, TransportError, TransportSettings,
};

/// Golden-ratio increment used to spread package indices over seeds.
const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// How a package's trajectory ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fate {
    /// Left the outermost volume or went where nothing lies ahead.
    Escaped,
    /// Weight dropped to (near) zero.
    Absorbed,
    /// Still travelling after the configured event limit.
    Abandoned,
}

/// Package counts per fate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Packages transported.
    pub emitted: u64,
    /// Packages that escaped.
    pub escaped: u64,
    /// Packages absorbed.
    pub absorbed: u64,
    /// Packages abandoned at the event limit.
    pub abandoned: u64,
}

impl RunSummary {
    /// Count one finished package.
    pub fn record(&mut self, fate: Fate) {
        self.emitted += 1;
        match fate {
            Fate::Escaped => self.escaped += 1,
            Fate::Absorbed => self.absorbed += 1,
            Fate::Abandoned => self.abandoned += 1,
        }
    }

    /// Add another summary's counts.
    pub fn merge(&mut self, other: &RunSummary) {
        self.emitted += other.emitted;
        self.escaped += other.escaped;
        self.absorbed += other.absorbed;
        self.abandoned += other.abandoned;
    }
}

/// A Monte Carlo run of one emitter through a scene.
///
/// The scene is borrowed immutably; receiver statistics accumulate in the
/// simulation's own [`Tally`]. Package `i` always draws from the same
/// random stream, so [`Simulation::run`] and [`Simulation::run_parallel`]
/// produce the same trajectories.
#[derive(Debug)]
pub struct Simulation<'a> {
    scene: &'a Scene<Medium>,
    emitter: Emitter,
    settings: TransportSettings,
    material: MaterialInteractor,
    wall: WallInteractor,
    next: u64,
    tally: Tally,
    summary: RunSummary,
}

impl<'a> Simulation<'a> {
    /// Prepare a run; nothing is transported until [`step`](Self::step),
    /// [`run`](Self::run) or [`run_parallel`](Self::run_parallel).
    pub fn new(scene: &'a Scene<Medium>, emitter: Emitter, settings: TransportSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            scene,
            emitter,
            material: MaterialInteractor::new(settings.sampling_asymmetry),
            wall: WallInteractor::new(settings.angle_generator),
            settings,
            next: 0,
            tally: Tally::new(),
            summary: RunSummary::default(),
        })
    }

    /// Packages not yet transported.
    pub fn remaining(&self) -> u64 {
        self.emitter.packages() - self.next
    }

    /// Transport the next package; `None` once the emitter is exhausted.
    ///
    /// A run can be stopped between any two steps.
    pub fn step(&mut self) -> Result<Option<Fate>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let index = self.next;
        let mut tally = Tally::new();
        let fate = self.transport(index, &mut tally)?;
        self.tally.merge(tally);
        self.summary.record(fate);
        self.next += 1;
        log::debug!("package {index}: {fate:?}");
        Ok(Some(fate))
    }

    /// Transport every remaining package in order.
    pub fn run(&mut self) -> Result<RunSummary> {
        log::info!("transporting {} packages", self.remaining());
        while self.step()?.is_some() {}
        self.log_summary();
        Ok(self.summary)
    }

    /// Transport every remaining package on the rayon thread pool.
    pub fn run_parallel(&mut self) -> Result<RunSummary> {
        let (start, end) = (self.next, self.emitter.packages());
        log::info!("transporting {} packages in parallel", end - start);

        let this = &*self;
        let (tally, summary) = (start..end)
            .into_par_iter()
            .try_fold(
                || (Tally::new(), RunSummary::default()),
                |(mut tally, mut summary), index| {
                    let fate = this.transport(index, &mut tally)?;
                    summary.record(fate);
                    Ok::<_, TransportError>((tally, summary))
                },
            )
            .try_reduce(
                || (Tally::new(), RunSummary::default()),
                |(mut tally, mut summary), (other_tally, other_summary)| {
                    tally.merge(other_tally);
                    summary.merge(&other_summary);
                    Ok((tally, summary))
                },
            )?;

        self.tally.merge(tally);
        self.summary.merge(&summary);
        self.next = end;
        self.log_summary();
        Ok(self.summary)
    }

    /// Fate counts so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Receiver statistics so far.
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Statistics of the receiver on the named volume.
    pub fn receiver(&self, name: &str, facing: Facing) -> Result<ReceiverStats> {
        let id = Navigator::new(self.scene).go_to_named(name)?;
        if !self.scene[id].content().has_receiver(facing) {
            return Err(TransportError::NoReceiver {
                volume: name.to_owned(),
                facing,
            });
        }
        Ok(self.tally.get(id, facing).copied().unwrap_or_default())
    }

    fn log_summary(&self) {
        let s = &self.summary;
        log::info!(
            "{} packages: {} escaped, {} absorbed, {} abandoned",
            s.emitted,
            s.escaped,
            s.absorbed,
            s.abandoned
        );
    }

    /// Follow package `index` until it escapes, is absorbed or runs out of
    /// events.
    fn transport(&self, index: u64, tally: &mut Tally) -> Result<Fate> {
        let mut rng = package_rng(self.settings.seed, index);
        let mut package = self.emitter.emit(&mut rng);

        let mut nav = Navigator::new(self.scene);
        let Some(start) = nav.locate(&package.pose.position) else {
            return Ok(Fate::Escaped);
        };
        nav.go_to(start)?;

        let mut tau: f64 = rng.sample(Exp1);
        for _ in 0..self.settings.max_events {
            if package.is_empty() {
                return Ok(Fate::Absorbed);
            }

            let material = nav.content().material();
            let crossing = nav.next_crossing(&package.pose);
            if crossing.is_none() && nav.outer_volume().is_none() {
                return Ok(Fate::Escaped);
            }
            let d_wall = crossing.map_or(f64::INFINITY, |(_, c)| c.distance);
            let d_scat = self.material.scattering_distance(material, &package, tau);
            let distance = d_scat.min(d_wall);
            if distance == f64::INFINITY {
                return Ok(Fate::Escaped);
            }

            let absorption =
                material.absorption_optical_depth(&package.pose, distance, package.wavelength);
            let travelled =
                material.scattering_optical_depth(&package.pose, distance, package.wavelength);
            package.move_by(distance);
            package.scale_intensity((-absorption).exp());

            let (crossed, crossing) = match crossing {
                Some(hit) if d_wall <= d_scat => hit,
                _ => {
                    if package.is_empty() {
                        return Ok(Fate::Absorbed);
                    }
                    self.material.scatter(material, &mut package, &mut rng);
                    tau = rng.sample(Exp1);
                    continue;
                }
            };
            tau = (tau - travelled).max(0.0);

            let epsilon = self.scene[crossed].boundary().epsilon();
            let beyond = crossing.position() + package.direction() * epsilon;
            let ahead = self.scene.transition(nav.current(), &beyond);
            let coated = governing_coating(self.scene, &ahead);

            let outcome = self.wall.interact(
                coated.map(|(_, coating)| coating),
                &crossing,
                epsilon,
                &mut package,
                &mut rng,
            );
            match outcome {
                WallOutcome::Absorbed => return Ok(Fate::Absorbed),
                WallOutcome::Reflected => {
                    if let Some((owner, _)) = coated {
                        let facing = if ahead.entered.contains(&owner) {
                            Facing::Outward
                        } else {
                            Facing::Inward
                        };
                        self.record(tally, owner, facing, &package);
                    }
                }
                WallOutcome::Transmitted => {
                    let transition = self.scene.transition(nav.current(), &package.pose.position);
                    for &id in &transition.exited {
                        self.record(tally, id, Facing::Outward, &package);
                    }
                    for &id in &transition.entered {
                        self.record(tally, id, Facing::Inward, &package);
                    }
                    match transition.destination {
                        Some(id) => nav.go_to(id)?,
                        None => return Ok(Fate::Escaped),
                    }
                }
            }
        }

        log::warn!(
            "package {index} abandoned after {} events",
            self.settings.max_events
        );
        Ok(Fate::Abandoned)
    }

    fn record(&self, tally: &mut Tally, volume: VolumeId, facing: Facing, package: &RadiationPackage) {
        if self.scene[volume].content().has_receiver(facing) {
            tally.record(volume, facing, package);
        }
    }
}

/// Coating that governs a crossing: the first coated volume entered, else
/// the first coated volume exited.
fn governing_coating<'s>(
    scene: &'s Scene<Medium>,
    transition: &Transition,
) -> Option<(VolumeId, &'s dyn Coating)> {
    transition
        .entered
        .iter()
        .chain(&transition.exited)
        .find_map(|&id| scene[id].content().coating().map(|coating| (id, coating)))
}

fn package_rng(seed: u64, index: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed ^ index.wrapping_mul(STREAM_STRIDE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use radtrace_geom::Boundary;
    use radtrace_math::{Point3, Pose, Vec3};
    use radtrace_optics::{AngleGenerator, GreyCoating, Homogeneous, Material, PhaseFunction};

    /// Vacuum world holding a sky (z > 1), a unit slab (0 < z < 1) and a
    /// floor (z < 0). Sky and floor both count inward flux.
    fn slab_scene(slab: impl Material + 'static) -> Scene<Medium> {
        let mut scene = Scene::new("world", Boundary::unbounded(), Medium::vacuum());
        let root = scene.root();
        scene
            .add_volume(
                root,
                "sky",
                Boundary::above(1.0),
                Medium::vacuum().with_receiver(Facing::Inward),
            )
            .unwrap();
        scene
            .add_volume(root, "slab", Boundary::slab(0.0, 1.0).unwrap(), Medium::new(slab))
            .unwrap();
        scene
            .add_volume(
                root,
                "floor",
                Boundary::below(0.0),
                Medium::vacuum().with_receiver(Facing::Inward),
            )
            .unwrap();
        scene
    }

    fn overhead(packages: u64) -> Emitter {
        Emitter::new(
            Pose::looking_along(Point3::new(0.0, 0.0, 2.0), &-Vec3::z()),
            packages,
        )
    }

    fn partial_floor_scene(coating: GreyCoating) -> Scene<Medium> {
        let mut scene = slab_scene(radtrace_optics::Vacuum);
        let floor = scene.find("floor").unwrap();
        *scene[floor].content_mut() = Medium::vacuum()
            .with_coating(coating)
            .with_receiver(Facing::Inward)
            .with_receiver(Facing::Outward);
        scene
    }

    fn scattering_slab() -> Homogeneous {
        Homogeneous::new(0.0, 1.0, PhaseFunction::Isotropic).unwrap()
    }

    #[test]
    fn test_transparent_scene_conserves_flux() {
        let scene = slab_scene(radtrace_optics::Vacuum);
        let mut sim = Simulation::new(&scene, overhead(100), TransportSettings::default()).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.emitted, 100);
        assert_eq!(summary.escaped, 100);

        let floor = sim.receiver("floor", Facing::Inward).unwrap();
        assert_eq!(floor.count, 100);
        assert_relative_eq!(floor.flux, 100.0, max_relative = 1e-12);
        assert_eq!(sim.receiver("sky", Facing::Inward).unwrap().count, 0);
        // Emitted one unit above the slab, crossed it, arrived at z = 0
        assert_relative_eq!(floor.mean_path_length(), 2.0, max_relative = 1e-6);
    }

    #[test]
    fn test_scattering_root_without_walls_escapes() {
        let scene = Scene::new(
            "fog",
            Boundary::unbounded(),
            Medium::new(scattering_slab()),
        );
        let settings = TransportSettings {
            max_events: 200,
            ..Default::default()
        };
        let emitter = Emitter::new(Pose::at(Point3::origin()), 5);
        let mut sim = Simulation::new(&scene, emitter, settings).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.escaped, 5);
        assert_eq!(summary.abandoned, 0);
    }

    #[test]
    fn test_partial_floor_splits_flux() {
        let scene = partial_floor_scene(GreyCoating::new(0.25, 0.75).unwrap());
        let n = 4_000;
        let mut sim = Simulation::new(&scene, overhead(n), TransportSettings::default()).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.escaped, n);

        let transmitted = sim.receiver("floor", Facing::Inward).unwrap();
        let reflected = sim.receiver("floor", Facing::Outward).unwrap();
        let n = n as f64;
        assert!((transmitted.flux / n - 0.75).abs() < 0.03, "T = {}", transmitted.flux / n);
        assert!((reflected.flux / n - 0.25).abs() < 0.03, "R = {}", reflected.flux / n);
        assert_relative_eq!(transmitted.flux + reflected.flux, n, max_relative = 1e-9);

        // Everything reflected by the floor climbs back out through the sky
        let sky = sim.receiver("sky", Facing::Inward).unwrap();
        assert_eq!(sky.count, reflected.count);
    }

    #[test]
    fn test_beer_lambert() {
        let a = 0.7;
        let scene = slab_scene(Homogeneous::absorbing(a).unwrap());
        let mut sim = Simulation::new(&scene, overhead(50), TransportSettings::default()).unwrap();
        sim.run().unwrap();
        let floor = sim.receiver("floor", Facing::Inward).unwrap();
        assert_relative_eq!(floor.flux, 50.0 * (-a).exp(), max_relative = 1e-5);
    }

    #[test]
    fn test_isotropic_slab_benchmark() {
        let scene = slab_scene(scattering_slab());
        let n = 20_000;
        let mut sim = Simulation::new(&scene, overhead(n), TransportSettings::default()).unwrap();
        let summary = sim.run_parallel().unwrap();
        assert_eq!(summary.emitted, n);
        assert_eq!(summary.abandoned, 0);

        let r = sim.receiver("sky", Facing::Inward).unwrap().flux / n as f64;
        let t = sim.receiver("floor", Facing::Inward).unwrap().flux / n as f64;
        assert!((r - 0.341).abs() < 0.02, "R = {r}");
        assert!((t - 0.659).abs() < 0.02, "T = {t}");
        assert!((r + t - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_importance_sampled_slab_is_unbiased() {
        let scene = slab_scene(scattering_slab());
        let n = 20_000;
        let settings = TransportSettings {
            sampling_asymmetry: 0.3,
            ..Default::default()
        };
        let mut sim = Simulation::new(&scene, overhead(n), settings).unwrap();
        sim.run_parallel().unwrap();
        let r = sim.receiver("sky", Facing::Inward).unwrap().flux / n as f64;
        assert!((r - 0.341).abs() < 0.03, "R = {r}");
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let scene = slab_scene(Homogeneous::new(0.2, 1.5, PhaseFunction::Rayleigh).unwrap());
        let settings = TransportSettings {
            seed: 99,
            ..Default::default()
        };

        let mut seq = Simulation::new(&scene, overhead(500), settings.clone()).unwrap();
        let a = seq.run().unwrap();
        let mut par = Simulation::new(&scene, overhead(500), settings).unwrap();
        let b = par.run_parallel().unwrap();

        assert_eq!(a, b);
        for name in ["sky", "floor"] {
            let x = seq.receiver(name, Facing::Inward).unwrap();
            let y = par.receiver(name, Facing::Inward).unwrap();
            assert_eq!(x.count, y.count);
            assert_relative_eq!(x.flux, y.flux, max_relative = 1e-9);
            assert_relative_eq!(x.weighted_path, y.weighted_path, max_relative = 1e-9);
        }
    }

    /// Vacuum half-space z > 0 over a coated floor z < 0 whose outward
    /// receiver counts reflected flux.
    fn floor_scene(coating: GreyCoating) -> Scene<Medium> {
        let mut scene = Scene::new("world", Boundary::unbounded(), Medium::vacuum());
        let root = scene.root();
        scene
            .add_volume(root, "sky", Boundary::above(0.0), Medium::vacuum())
            .unwrap();
        scene
            .add_volume(
                root,
                "floor",
                Boundary::below(0.0),
                Medium::vacuum()
                    .with_coating(coating)
                    .with_receiver(Facing::Outward),
            )
            .unwrap();
        scene
    }

    #[test]
    fn test_white_floor_returns_all_flux() {
        let scene = floor_scene(GreyCoating::white());
        let emitter = Emitter::new(Pose::looking_along(Point3::new(0.0, 0.0, 1.0), &-Vec3::z()), 1_000);

        let mut sim = Simulation::new(&scene, emitter.clone(), TransportSettings::default()).unwrap();
        sim.run().unwrap();
        let lambertian = sim.receiver("floor", Facing::Outward).unwrap();
        assert_eq!(lambertian.count, 1_000);
        assert_relative_eq!(lambertian.flux, 1_000.0, max_relative = 1e-9);

        let n = 20_000;
        let emitter = Emitter::new(*emitter.pose(), n);
        let settings = TransportSettings {
            angle_generator: AngleGenerator::UniformHemisphere,
            ..Default::default()
        };
        let mut sim = Simulation::new(&scene, emitter, settings).unwrap();
        let summary = sim.run_parallel().unwrap();
        assert_eq!(summary.escaped, n);
        let uniform = sim.receiver("floor", Facing::Outward).unwrap();
        assert!((uniform.flux / n as f64 - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_black_floor_absorbs() {
        let scene = floor_scene(GreyCoating::black());
        let emitter = Emitter::new(Pose::looking_along(Point3::new(0.0, 0.0, 1.0), &-Vec3::z()), 10);
        let mut sim = Simulation::new(&scene, emitter, TransportSettings::default()).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.absorbed, 10);
        assert_eq!(sim.receiver("floor", Facing::Outward).unwrap().count, 0);
    }

    #[test]
    fn test_trapped_package_is_abandoned() {
        let mut scene = Scene::new("world", Boundary::unbounded(), Medium::vacuum());
        let root = scene.root();
        scene
            .add_volume(
                root,
                "mirror ball",
                Boundary::sphere(1.0).unwrap(),
                Medium::vacuum()
                    .with_coating(GreyCoating::white())
                    .with_receiver(Facing::Inward),
            )
            .unwrap();
        let settings = TransportSettings {
            max_events: 25,
            ..Default::default()
        };
        let mut sim = Simulation::new(&scene, Emitter::new(Pose::identity(), 3), settings).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.abandoned, 3);
        assert_eq!(sim.receiver("mirror ball", Facing::Inward).unwrap().count, 75);
    }

    #[test]
    fn test_emitter_outside_scene_escapes() {
        let scene = Scene::new("world", Boundary::sphere(1.0).unwrap(), Medium::vacuum());
        let emitter = Emitter::new(Pose::at(Point3::new(5.0, 0.0, 0.0)), 4);
        let mut sim = Simulation::new(&scene, emitter, TransportSettings::default()).unwrap();
        assert_eq!(sim.run().unwrap().escaped, 4);
    }

    #[test]
    fn test_step_and_remaining() {
        let scene = slab_scene(radtrace_optics::Vacuum);
        let mut sim = Simulation::new(&scene, overhead(2), TransportSettings::default()).unwrap();
        assert_eq!(sim.remaining(), 2);
        assert_eq!(sim.step().unwrap(), Some(Fate::Escaped));
        assert_eq!(sim.remaining(), 1);
        sim.run().unwrap();
        assert_eq!(sim.step().unwrap(), None);
        assert_eq!(sim.summary().emitted, 2);
    }

    #[test]
    fn test_receiver_lookup_errors() {
        let scene = slab_scene(radtrace_optics::Vacuum);
        let sim = Simulation::new(&scene, overhead(1), TransportSettings::default()).unwrap();
        assert!(matches!(
            sim.receiver("ceiling", Facing::Inward),
            Err(TransportError::Scene(_))
        ));
        assert_eq!(
            sim.receiver("slab", Facing::Outward),
            Err(TransportError::NoReceiver {
                volume: "slab".into(),
                facing: Facing::Outward
            })
        );
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let scene = slab_scene(radtrace_optics::Vacuum);
        let settings = TransportSettings {
            sampling_asymmetry: -1.2,
            ..Default::default()
        };
        assert!(Simulation::new(&scene, overhead(1), settings).is_err());
    }
}
