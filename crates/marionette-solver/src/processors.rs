//! Retargeting processors built on the solver and the mapper.
//!
//! - [`BoneTargetProcessor`] drives a [`BoneTargetMapper`] every frame.
//! - [`PositionConstraintProcessor`] drives a [`ConstraintSolver`] every
//!   frame.
//!
//! Both run either synchronously or as a job, and both accept a JSON
//! configuration file through `load_config`.
//!
//! # Configuration files
//!
//! Bone targets (`targets` names are looked up in the processor's
//! [`TargetDirectory`]):
//!
//! ```json
//! { "targets": [ { "bone": "RightHand", "target": "sword_grip" } ] }
//! ```
//!
//! Position constraint:
//!
//! ```json
//! { "weight": 0.75 }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use marionette_pipeline::{
    GizmoSink, JobHandle, JobScheduler, ProcessorType, RetargetingLayer, RetargetingProcessor,
};
use marionette_types::{BoneId, BoneSample, FrameBones, HumanBodyBone, RigError, TransformRef};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::constraint::ConstraintSolver;
use crate::mapper::{BoneTargetDeclaration, BoneTargetMapper};

// ─────────────────────────────────────────────────────────────────────────────
// TargetDirectory
// ─────────────────────────────────────────────────────────────────────────────

/// Named output transforms that configuration files may refer to.
#[derive(Debug, Clone, Default)]
pub struct TargetDirectory {
    targets: HashMap<String, TransformRef>,
}

impl TargetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`TargetDirectory::insert`].
    pub fn with(mut self, name: impl Into<String>, transform: TransformRef) -> Self {
        self.insert(name, transform);
        self
    }

    /// Register `transform` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, transform: TransformRef) {
        self.targets.insert(name.into(), transform);
    }

    pub fn get(&self, name: &str) -> Option<&TransformRef> {
        self.targets.get(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config file schemas
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BoneTargetsConfig {
    targets: Vec<BoneTargetEntry>,
}

#[derive(Debug, Deserialize)]
struct BoneTargetEntry {
    bone: HumanBodyBone,
    target: String,
}

#[derive(Debug, Deserialize)]
struct PositionConstraintConfig {
    #[serde(default)]
    weight: Option<f32>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RigError> {
    let raw = fs::read_to_string(path).map_err(|e| RigError::ConfigLoad {
        path: path.display().to_string(),
        details: format!("failed to read: {e}"),
    })?;
    serde_json::from_str(&raw).map_err(|e| RigError::ConfigLoad {
        path: path.display().to_string(),
        details: format!("failed to parse: {e}"),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// BoneTargetProcessor
// ─────────────────────────────────────────────────────────────────────────────

/// Copies tracked bones onto output transforms each frame.
pub struct BoneTargetProcessor {
    label: String,
    kind: ProcessorType,
    directory: TargetDirectory,
    mapper: Arc<BoneTargetMapper>,
    /// Rig name and bone ids seen at the last `setup`.
    rig: Option<(String, Vec<BoneId>)>,
}

impl BoneTargetProcessor {
    /// Wrap an already-configured mapper.
    pub fn new(label: impl Into<String>, kind: ProcessorType, mapper: BoneTargetMapper) -> Self {
        Self {
            label: label.into(),
            kind,
            directory: TargetDirectory::new(),
            mapper: Arc::new(mapper),
            rig: None,
        }
    }

    /// A processor with no targets yet; call
    /// [`load_config`][RetargetingProcessor::load_config] to populate it from
    /// names in `directory`.
    pub fn with_directory(label: impl Into<String>, kind: ProcessorType, directory: TargetDirectory) -> Self {
        Self {
            label: label.into(),
            kind,
            directory,
            mapper: Arc::new(BoneTargetMapper::default()),
            rig: None,
        }
    }

    pub fn mapper(&self) -> &BoneTargetMapper {
        &self.mapper
    }

    /// Mapped bones absent from the rig seen at `setup`.  Empty before setup.
    pub fn missing_rig_bones(&self) -> Vec<BoneId> {
        let Some((_, available)) = &self.rig else {
            return Vec::new();
        };
        self.mapper
            .targets()
            .iter()
            .map(|target| target.bone_id())
            .filter(|id| !available.contains(id))
            .collect()
    }

    fn warn_missing_rig_bones(&self) {
        let Some((layer, _)) = &self.rig else {
            return;
        };
        for bone in self.missing_rig_bones() {
            warn!(
                processor = %self.label,
                ?bone,
                layer = %layer,
                "target bone not present in rig; it will only follow tracked samples"
            );
        }
    }
}

impl RetargetingProcessor for BoneTargetProcessor {
    fn label(&self) -> &str {
        &self.label
    }

    fn processor_type(&self) -> ProcessorType {
        self.kind
    }

    fn setup(&mut self, layer: &dyn RetargetingLayer) -> Result<(), RigError> {
        self.rig = Some((layer.name().to_string(), layer.bone_ids()));
        self.warn_missing_rig_bones();
        Ok(())
    }

    fn process(&mut self, _layer: &dyn RetargetingLayer, bones: &[BoneSample]) -> Result<(), RigError> {
        let written = self.mapper.update(bones);
        debug!(processor = %self.label, written, "bone targets updated");
        Ok(())
    }

    fn process_as_job(
        &mut self,
        previous: &JobHandle,
        _layer: &dyn RetargetingLayer,
        bones: &FrameBones,
        scheduler: &dyn JobScheduler,
    ) -> Result<JobHandle, RigError> {
        let mapper = Arc::clone(&self.mapper);
        let bones = Arc::clone(bones);
        Ok(scheduler.schedule(
            previous,
            Box::new(move || {
                mapper.update(&bones);
            }),
        ))
    }

    fn draw_gizmos(&self, gizmos: &mut dyn GizmoSink) {
        for target in self.mapper.targets() {
            gizmos.point(target.output().position());
        }
    }

    fn load_config(&mut self, path: &Path) -> Result<(), RigError> {
        let config: BoneTargetsConfig = read_json(path)?;
        let declarations = config
            .targets
            .into_iter()
            .map(|entry| {
                let output = self.directory.get(&entry.target).cloned().ok_or_else(|| {
                    RigError::configuration(&self.label, format!("unknown target '{}'", entry.target))
                })?;
                Ok(BoneTargetDeclaration::new(entry.bone, output))
            })
            .collect::<Result<Vec<_>, RigError>>()?;
        self.mapper = Arc::new(BoneTargetMapper::configure(declarations)?);
        info!(processor = %self.label, targets = self.mapper.targets().len(), "bone targets loaded");
        self.warn_missing_rig_bones();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PositionConstraintProcessor
// ─────────────────────────────────────────────────────────────────────────────

/// Applies a [`ConstraintSolver`] each frame.
pub struct PositionConstraintProcessor {
    label: String,
    kind: ProcessorType,
    solver: Arc<ConstraintSolver>,
}

impl PositionConstraintProcessor {
    pub fn new(label: impl Into<String>, kind: ProcessorType, solver: ConstraintSolver) -> Self {
        Self {
            label: label.into(),
            kind,
            solver: Arc::new(solver),
        }
    }

    pub fn solver(&self) -> &ConstraintSolver {
        &self.solver
    }
}

impl RetargetingProcessor for PositionConstraintProcessor {
    fn label(&self) -> &str {
        &self.label
    }

    fn processor_type(&self) -> ProcessorType {
        self.kind
    }

    fn setup(&mut self, _layer: &dyn RetargetingLayer) -> Result<(), RigError> {
        debug!(processor = %self.label, sources = self.solver.sources().len(), "constraint ready");
        Ok(())
    }

    fn process(&mut self, _layer: &dyn RetargetingLayer, _bones: &[BoneSample]) -> Result<(), RigError> {
        self.solver.update();
        Ok(())
    }

    fn process_as_job(
        &mut self,
        previous: &JobHandle,
        _layer: &dyn RetargetingLayer,
        _bones: &FrameBones,
        scheduler: &dyn JobScheduler,
    ) -> Result<JobHandle, RigError> {
        let solver = Arc::clone(&self.solver);
        Ok(scheduler.schedule(previous, Box::new(move || solver.update())))
    }

    fn draw_gizmos(&self, gizmos: &mut dyn GizmoSink) {
        let to = self.solver.target().position();
        for source in self.solver.sources() {
            gizmos.line(source.source.position(), to);
        }
    }

    fn load_config(&mut self, path: &Path) -> Result<(), RigError> {
        let config: PositionConstraintConfig = read_json(path)?;
        if let Some(weight) = config.weight {
            Arc::make_mut(&mut self.solver).set_weight(weight);
            info!(processor = %self.label, weight, "constraint weight updated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{ConstraintSource, PositionConstraint};
    use marionette_pipeline::{GizmoPrimitive, GizmoRecorder, ImmediateScheduler, RetargetingPipeline, RigLayer};
    use marionette_types::{BoneId, Vec3};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    fn solver(target: &TransformRef, weight: f32) -> ConstraintSolver {
        ConstraintSolver::from_definition(Some(&PositionConstraint {
            target: target.clone(),
            weight,
            active: true,
            sources: vec![
                ConstraintSource::new(TransformRef::at(Vec3::new(0.0, 0.0, 0.0)), 0.5),
                ConstraintSource::new(TransformRef::at(Vec3::new(2.0, 0.0, 0.0)), 0.5),
            ],
        }))
        .unwrap()
    }

    fn frame(samples: Vec<BoneSample>) -> FrameBones {
        samples.into()
    }

    // ── BoneTargetProcessor ─────────────────────────────────────────────────

    #[test]
    fn bone_targets_sync_and_job_modes_agree() {
        let wrist = TransformRef::at(Vec3::new(0.4, 1.1, 0.2));
        let bones = frame(vec![BoneSample::tracked(BoneId::LeftHandWrist, wrist.clone())]);
        let layer = RigLayer::new("avatar");

        for kind in [ProcessorType::Sync, ProcessorType::Job] {
            let prop = TransformRef::default();
            let mapper =
                BoneTargetMapper::configure(vec![BoneTargetDeclaration::new(HumanBodyBone::LeftHand, prop.clone())])
                    .unwrap();

            let mut pipeline = RetargetingPipeline::new();
            pipeline.add(Box::new(BoneTargetProcessor::new("hand_prop", kind, mapper)));
            pipeline.setup(&layer).unwrap();
            pipeline.run_frame(&layer, &bones, &ImmediateScheduler).unwrap().wait();

            assert_eq!(prop.position(), wrist.position(), "{kind:?}");
        }
    }

    #[test]
    fn bone_targets_load_from_json() {
        let grip = TransformRef::default();
        let directory = TargetDirectory::new().with("sword_grip", grip.clone());
        let mut processor = BoneTargetProcessor::with_directory("props", ProcessorType::Sync, directory);

        let file = write_config(r#"{ "targets": [ { "bone": "RightHand", "target": "sword_grip" } ] }"#);
        processor.load_config(file.path()).unwrap();

        assert_eq!(processor.mapper().targets().len(), 1);
        assert_eq!(processor.mapper().targets()[0].bone_id(), BoneId::RightHandWrist);

        let wrist = TransformRef::at(Vec3::new(1.0, 2.0, 3.0));
        processor
            .process(&RigLayer::new("avatar"), &[BoneSample::tracked(BoneId::RightHandWrist, wrist)])
            .unwrap();
        assert_eq!(grip.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn bone_targets_unknown_target_name_is_configuration_error() {
        let mut processor = BoneTargetProcessor::with_directory("props", ProcessorType::Sync, TargetDirectory::new());
        let file = write_config(r#"{ "targets": [ { "bone": "Head", "target": "hat" } ] }"#);

        let err = processor.load_config(file.path()).unwrap_err();
        assert!(matches!(err, RigError::Configuration { .. }));
        assert!(processor.mapper().is_empty());
    }

    #[test]
    fn bone_targets_unmappable_bone_keeps_previous_mapping() {
        let hat = TransformRef::default();
        let directory = TargetDirectory::new().with("hat", hat.clone());
        let mut processor = BoneTargetProcessor::with_directory("props", ProcessorType::Sync, directory);

        processor
            .load_config(write_config(r#"{ "targets": [ { "bone": "Head", "target": "hat" } ] }"#).path())
            .unwrap();
        let err = processor
            .load_config(write_config(r#"{ "targets": [ { "bone": "Jaw", "target": "hat" } ] }"#).path())
            .unwrap_err();

        assert!(matches!(err, RigError::Configuration { .. }));
        assert_eq!(processor.mapper().targets()[0].bone_id(), BoneId::Head);
    }

    #[test]
    fn reloaded_targets_are_checked_against_rig() {
        let directory = TargetDirectory::new()
            .with("belt", TransformRef::default())
            .with("hat", TransformRef::default());
        let mut processor = BoneTargetProcessor::with_directory("props", ProcessorType::Sync, directory);
        let layer = RigLayer::new("avatar").with_bone(BoneId::Hips, TransformRef::default());

        // Nothing to compare against before setup.
        processor
            .load_config(write_config(r#"{ "targets": [ { "bone": "Head", "target": "hat" } ] }"#).path())
            .unwrap();
        assert!(processor.missing_rig_bones().is_empty());

        processor.setup(&layer).unwrap();
        assert_eq!(processor.missing_rig_bones(), vec![BoneId::Head]);

        processor
            .load_config(write_config(r#"{ "targets": [ { "bone": "Hips", "target": "belt" } ] }"#).path())
            .unwrap();
        assert!(processor.missing_rig_bones().is_empty());
    }

    #[test]
    fn malformed_json_is_config_load_error() {
        let mut processor = BoneTargetProcessor::with_directory("props", ProcessorType::Sync, TargetDirectory::new());
        let err = processor.load_config(write_config("{ not json").path()).unwrap_err();
        assert!(matches!(err, RigError::ConfigLoad { .. }));
    }

    #[test]
    fn missing_file_is_config_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut processor = BoneTargetProcessor::with_directory("props", ProcessorType::Sync, TargetDirectory::new());
        let err = processor.load_config(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RigError::ConfigLoad { .. }));
    }

    #[test]
    fn bone_target_gizmos_mark_each_target() {
        let mapper = BoneTargetMapper::configure(vec![BoneTargetDeclaration::new(
            HumanBodyBone::Head,
            TransformRef::at(Vec3::new(0.0, 1.7, 0.0)),
        )])
        .unwrap();
        let processor = BoneTargetProcessor::new("hat", ProcessorType::Sync, mapper);

        let mut recorder = GizmoRecorder::new();
        processor.draw_gizmos(&mut recorder);
        assert_eq!(
            recorder.primitives(),
            &[GizmoPrimitive::Point { at: Vec3::new(0.0, 1.7, 0.0) }]
        );
    }

    // ── PositionConstraintProcessor ─────────────────────────────────────────

    #[test]
    fn constraint_processor_sync_and_job_modes_agree() {
        let layer = RigLayer::new("avatar");
        for kind in [ProcessorType::Sync, ProcessorType::Job] {
            let target = TransformRef::default();
            let mut pipeline = RetargetingPipeline::new();
            pipeline.add(Box::new(PositionConstraintProcessor::new("blend", kind, solver(&target, 1.0))));
            pipeline.setup(&layer).unwrap();
            pipeline
                .run_frame(&layer, &frame(Vec::new()), &ImmediateScheduler)
                .unwrap()
                .wait();
            assert_eq!(target.position(), Vec3::new(1.0, 0.0, 0.0), "{kind:?}");
        }
    }

    #[test]
    fn constraint_weight_loads_from_json() {
        let target = TransformRef::default();
        let mut processor = PositionConstraintProcessor::new("blend", ProcessorType::Sync, solver(&target, 1.0));

        processor.load_config(write_config(r#"{ "weight": 0.5 }"#).path()).unwrap();
        assert_eq!(processor.solver().weight(), 0.5);

        processor.process(&RigLayer::new("avatar"), &[]).unwrap();
        assert_eq!(target.position(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn constraint_config_without_weight_is_noop() {
        let target = TransformRef::default();
        let mut processor = PositionConstraintProcessor::new("blend", ProcessorType::Sync, solver(&target, 0.25));
        processor.load_config(write_config("{}").path()).unwrap();
        assert_eq!(processor.solver().weight(), 0.25);
    }

    #[test]
    fn constraint_gizmos_draw_one_line_per_source() {
        let target = TransformRef::default();
        let processor = PositionConstraintProcessor::new("blend", ProcessorType::Sync, solver(&target, 1.0));

        let mut recorder = GizmoRecorder::new();
        processor.draw_gizmos(&mut recorder);
        assert_eq!(recorder.primitives().len(), 2);
    }
}
