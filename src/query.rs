//! Convenience queries over a [`Drawing`]
//!
//! Thin wrappers that assemble common filters; all real work happens in the
//! engine. Each helper returns a lazily-evaluated view or a collected result,
//! sharing the drawing as the referent store.

use crate::cache::ReferentCache;
use crate::error::{FilterError, Result};
use crate::expr::Expr;
use crate::filter::KeySelector;
use crate::member::MemberFilter;
use crate::model::{Drawing, Entity, Layer, LineType};
use crate::store::Resolve;
use crate::types::{Color, Handle};
use crate::view::{FilteredView, WhereBy};
use std::rc::Rc;

/// The standard "owning layer" key selector for entities
pub fn layer_key() -> KeySelector<Entity> {
    KeySelector::new("entity.layer", |e: &Entity| e.layer)
}

/// The standard "referenced line type" key selector for entities
pub fn line_type_key() -> KeySelector<Entity> {
    KeySelector::new("entity.line_type", |e: &Entity| e.line_type)
}

/// Entities on layers that are neither locked nor frozen
pub fn editable_entities(drawing: &Rc<Drawing>) -> Result<FilteredView<'_, Entity, Layer, Drawing>> {
    drawing.entities().where_by(
        Rc::clone(drawing),
        layer_key(),
        Expr::named("editable", |layer: &Layer| !layer.is_locked()),
    )
}

/// Entities on layers that are neither frozen nor off
pub fn visible_entities(drawing: &Rc<Drawing>) -> Result<FilteredView<'_, Entity, Layer, Drawing>> {
    drawing.entities().where_by(
        Rc::clone(drawing),
        layer_key(),
        Expr::named("visible", |layer: &Layer| layer.is_visible()),
    )
}

/// Entities referencing a non-continuous line type directly (not by layer)
pub fn dashed_entities(drawing: &Rc<Drawing>) -> Result<FilteredView<'_, Entity, LineType, Drawing>> {
    let view = drawing.entities().where_by(
        Rc::clone(drawing),
        line_type_key(),
        Expr::named("dashed", |lt: &LineType| !lt.is_continuous()),
    )?;
    // A null line type handle means "by layer"; those entities never match
    view.filter()
        .cache()
        .set_missing_key_fallback(|_| Ok(false));
    Ok(view)
}

/// Entities placed on the named layer
pub fn entities_on_layer<'a>(drawing: &'a Rc<Drawing>, name: &str) -> Result<Vec<&'a Entity>> {
    let layer = drawing
        .layer(name)
        .ok_or_else(|| FilterError::Custom(format!("layer '{}' not found", name)))?;
    let member = MemberFilter::single(|e: &Entity| e.layer, layer.handle);
    Ok(drawing
        .entities()
        .iter()
        .filter(|e| member.is_match(e))
        .collect())
}

/// A memoized entity → layer color lookup
///
/// Shows the cache carrying a non-boolean value: each distinct layer is
/// resolved once, and every entity on it shares the cached color.
pub fn layer_color_cache(drawing: &Rc<Drawing>) -> ReferentCache<Entity, Handle, Layer, Color> {
    ReferentCache::new(
        |e: &Entity| e.layer,
        |layer: &Layer| Ok(layer.color),
        Rc::clone(drawing) as Rc<dyn Resolve<Handle, Layer>>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    fn sample_drawing() -> Rc<Drawing> {
        let mut drawing = Drawing::new();
        let mut locked = Layer::with_color("Locked", Color::RED);
        locked.lock();
        let locked = drawing.add_layer(locked).unwrap();
        let open = drawing
            .add_layer(Layer::with_color("Open", Color::GREEN))
            .unwrap();
        let dashed = drawing.add_line_type(LineType::dashed()).unwrap();

        drawing.add_entity(Entity::new(EntityKind::Line).on_layer(locked));
        drawing.add_entity(Entity::new(EntityKind::Circle).on_layer(open));
        drawing.add_entity(
            Entity::new(EntityKind::Arc)
                .on_layer(open)
                .with_line_type(dashed),
        );
        Rc::new(drawing)
    }

    #[test]
    fn test_editable_entities() {
        let drawing = sample_drawing();
        let view = editable_entities(&drawing).unwrap();
        let matched = view.collect_matches().unwrap();
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|e| e.kind != EntityKind::Line));
    }

    #[test]
    fn test_dashed_entities_skip_by_layer() {
        let drawing = sample_drawing();
        let view = dashed_entities(&drawing).unwrap();
        let matched = view.collect_matches().unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].kind, EntityKind::Arc);
    }

    #[test]
    fn test_entities_on_layer() {
        let drawing = sample_drawing();
        assert_eq!(entities_on_layer(&drawing, "open").unwrap().len(), 2);
        assert_eq!(entities_on_layer(&drawing, "locked").unwrap().len(), 1);
        assert!(entities_on_layer(&drawing, "absent").is_err());
    }

    #[test]
    fn test_layer_color_cache() {
        let drawing = sample_drawing();
        let cache = layer_color_cache(&drawing);
        let entities = drawing.entities();

        assert_eq!(cache.evaluate(&entities[0]).unwrap(), Color::RED);
        assert_eq!(cache.evaluate(&entities[1]).unwrap(), Color::GREEN);
        assert_eq!(cache.evaluate(&entities[2]).unwrap(), Color::GREEN);
        assert_eq!(cache.len(), 2, "one entry per distinct layer");
    }
}
