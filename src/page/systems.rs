// src/page/systems.rs
//
// Systems drawing the demo page and translating input into mascot messages.

use bevy::input::{
    keyboard::{Key, KeyboardInput},
    ButtonState,
};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::mascot::{
    Animation, CharacterClicked, DismissRequested, HostCommand, MascotConfig, MascotSnapshot,
    PageLayout, SummonKeywordEntered, TabChanged, TabId, ToggleClicked,
};

use super::components::{
    page_to_world, BubbleNode, CharacterSprite, DustSprite, PageLabel, PageState, SEARCH_FIELD,
    SECONDARY_TAB, TOGGLE_BUTTON,
};

// Visual constants
const PAGE_COLOR: Color = Color::srgb(0.93, 0.92, 0.88);
const PANEL_COLOR: Color = Color::srgb(0.55, 0.62, 0.72);
const FIELD_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
const BUBBLE_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.85);
const TEXT_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
const LABEL_COLOR: Color = Color::srgb(0.15, 0.15, 0.15);
const DUST_COLOR: Color = Color::srgb(0.6, 0.5, 0.4);
const DUST_SIZE: f32 = 6.0;
const FONT_SIZE: f32 = 15.0;
const PADDING_PX: f32 = 6.0;

// Panels sit between a lowered (hidden) character and a raised one.
const PANEL_Z: f32 = 1.0;
const LOWERED_Z: f32 = 0.5;
const RAISED_Z: f32 = 2.0;

/// Spawns the camera, page panels, the character sprite and UI text.
pub fn spawn_page(mut commands: Commands, layout: Res<PageLayout>, config: Res<MascotConfig>) {
    commands.insert_resource(ClearColor(PAGE_COLOR));
    commands.insert_resource(PageState::new(TabId::new(config.summon.primary_tab.clone())));
    commands.spawn(Camera2d);

    for anchor in &layout.anchors {
        commands.spawn((
            Sprite::from_color(PANEL_COLOR, anchor.rect.size()),
            Transform::from_translation(page_to_world(
                anchor.rect.min,
                anchor.rect.size(),
                layout.viewport,
                PANEL_Z,
            )),
        ));
    }

    if let Some(control) = layout.summon_control {
        commands.spawn((
            Sprite::from_color(FIELD_COLOR, control.size()),
            Transform::from_translation(page_to_world(
                control.min,
                control.size(),
                layout.viewport,
                PANEL_Z,
            )),
        ));
    }

    commands.spawn((
        Sprite::from_color(animation_color(Some(Animation::Idle)), config.sprite.size),
        Transform::default(),
        Visibility::Hidden,
        CharacterSprite,
    ));

    spawn_label(&mut commands, Vec2::new(16.0, 16.0), PageLabel::Tab);
    spawn_label(
        &mut commands,
        SEARCH_FIELD.min + Vec2::splat(PADDING_PX),
        PageLabel::Search,
    );
    spawn_label(
        &mut commands,
        TOGGLE_BUTTON.min + Vec2::splat(PADDING_PX),
        PageLabel::Toggle,
    );

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Px(config.dialogue.bubble_size.x),
            min_height: Val::Px(config.dialogue.bubble_size.y),
            padding: UiRect::all(Val::Px(PADDING_PX)),
            display: Display::None,
            ..default()
        },
        BackgroundColor(BUBBLE_COLOR),
        ZIndex(10),
        Text::new(""),
        TextFont {
            font_size: FONT_SIZE,
            ..default()
        },
        TextColor(TEXT_COLOR),
        BubbleNode,
    ));

    info!("Demo page spawned with {} panels", layout.anchors.len());
}

fn spawn_label(commands: &mut Commands, at: Vec2, label: PageLabel) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(at.x),
            top: Val::Px(at.y),
            ..default()
        },
        Text::new(""),
        TextFont {
            font_size: FONT_SIZE,
            ..default()
        },
        TextColor(LABEL_COLOR),
        label,
    ));
}

/// Keeps the layout viewport equal to the window's logical size.
pub fn sync_viewport(window: Single<&Window, With<PrimaryWindow>>, mut layout: ResMut<PageLayout>) {
    let size = Vec2::new(window.width(), window.height());
    if layout.viewport != size {
        layout.viewport = size;
    }
}

/// F1/F2 switch tabs, F3 rings the bell, Escape dismisses the character,
/// anything else types into the search field.
pub fn read_keyboard_input(
    mut keys: MessageReader<KeyboardInput>,
    config: Res<MascotConfig>,
    mut page: ResMut<PageState>,
    mut tabs: MessageWriter<TabChanged>,
    mut toggles: MessageWriter<ToggleClicked>,
    mut summons: MessageWriter<SummonKeywordEntered>,
    mut dismissals: MessageWriter<DismissRequested>,
) {
    let before = page.search().to_string();

    for event in keys.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        match &event.logical_key {
            Key::F1 => {
                let primary = TabId::new(config.summon.primary_tab.clone());
                switch_tab(&mut page, primary, &mut tabs);
            }
            Key::F2 => switch_tab(&mut page, TabId::new(SECONDARY_TAB), &mut tabs),
            Key::F3 => {
                toggles.write(ToggleClicked);
            }
            Key::Escape => {
                dismissals.write(DismissRequested);
            }
            Key::Backspace => page.backspace(),
            Key::Space => page.type_text(" "),
            Key::Character(text) => page.type_text(text.as_str()),
            _ => {}
        }
    }

    if page.search() != before && config.summon.matches(page.search()) {
        info!("Search field holds the summon keyword");
        summons.write(SummonKeywordEntered);
    }
}

fn switch_tab(page: &mut PageState, tab: TabId, writer: &mut MessageWriter<TabChanged>) {
    if page.tab == tab {
        return;
    }
    page.tab = tab.clone();
    writer.write(TabChanged { tab });
}

/// Left click on the character talks to it; on the bell flips the toggle.
pub fn read_pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    window: Single<&Window, With<PrimaryWindow>>,
    snapshot: Res<MascotSnapshot>,
    page: Res<PageState>,
    mut clicks: MessageWriter<CharacterClicked>,
    mut toggles: MessageWriter<ToggleClicked>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    if snapshot.contains(cursor) {
        clicks.write(CharacterClicked);
    } else if page.toggle_visible && TOGGLE_BUTTON.contains(cursor) {
        toggles.write(ToggleClicked);
    }
}

pub fn apply_host_commands(
    mut host_commands: MessageReader<HostCommand>,
    mut page: ResMut<PageState>,
) {
    for command in host_commands.read() {
        page.apply(command);
    }
}

pub fn draw_character(
    snapshot: Res<MascotSnapshot>,
    layout: Res<PageLayout>,
    mut query: Query<(&mut Transform, &mut Sprite, &mut Visibility), With<CharacterSprite>>,
) {
    let Ok((mut transform, mut sprite, mut visibility)) = query.single_mut() else {
        return;
    };

    *visibility = if snapshot.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    let z = if snapshot.z_lowered {
        LOWERED_Z
    } else {
        RAISED_Z
    };
    transform.translation = page_to_world(
        snapshot.draw_position(),
        snapshot.sprite_size,
        layout.viewport,
        z,
    );
    // Odd frames are drawn slightly darker so the cadence is visible.
    let shade = if snapshot.frame_index % 2 == 0 { 1.0 } else { 0.85 };
    let base = animation_color(snapshot.animation).to_srgba();
    sprite.color = Color::srgb(base.red * shade, base.green * shade, base.blue * shade);
}

pub fn draw_dust(
    mut commands: Commands,
    snapshot: Res<MascotSnapshot>,
    layout: Res<PageLayout>,
    existing: Query<Entity, With<DustSprite>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    for puff in &snapshot.dust {
        let size = Vec2::splat(DUST_SIZE);
        commands.spawn((
            Sprite::from_color(DUST_COLOR.with_alpha(puff.alpha), size),
            Transform::from_translation(page_to_world(
                puff.position - size / 2.0,
                size,
                layout.viewport,
                RAISED_Z,
            )),
            DustSprite,
        ));
    }
}

pub fn draw_bubble(
    snapshot: Res<MascotSnapshot>,
    mut query: Query<(&mut Node, &mut Text), With<BubbleNode>>,
) {
    let Ok((mut node, mut text)) = query.single_mut() else {
        return;
    };

    match &snapshot.bubble {
        Some(bubble) => {
            node.display = Display::Flex;
            node.left = Val::Px(bubble.origin.x);
            node.top = Val::Px(bubble.origin.y);
            if text.0 != bubble.text {
                text.0 = bubble.text.clone();
            }
        }
        None => node.display = Display::None,
    }
}

pub fn draw_labels(page: Res<PageState>, mut labels: Query<(&PageLabel, &mut Text, &mut Visibility)>) {
    for (label, mut text, mut visibility) in labels.iter_mut() {
        let content = match label {
            PageLabel::Tab => format!("Tab: {} (F1/F2)", page.tab),
            PageLabel::Search => format!("Search: {}", page.search()),
            PageLabel::Toggle => {
                if page.toggle_enabled {
                    "Bell on".to_string()
                } else {
                    "Bell off".to_string()
                }
            }
        };
        if text.0 != content {
            text.0 = content;
        }
        *visibility = match label {
            PageLabel::Toggle if !page.toggle_visible => Visibility::Hidden,
            _ => Visibility::Inherited,
        };
    }
}

fn animation_color(animation: Option<Animation>) -> Color {
    match animation {
        Some(Animation::Idle) => Color::srgb(0.95, 0.65, 0.2),
        Some(Animation::Walk) => Color::srgb(0.85, 0.45, 0.15),
        Some(Animation::Run) => Color::srgb(0.85, 0.2, 0.15),
        Some(Animation::Sit) => Color::srgb(0.6, 0.4, 0.6),
        None => Color::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_command_messages_reach_page_state() {
        let mut app = App::new();
        app.add_message::<HostCommand>()
            .insert_resource(PageState::new(TabId::new(SECONDARY_TAB)))
            .add_systems(Update, apply_host_commands);

        app.world_mut()
            .write_message(HostCommand::SwitchTab(TabId::new("main")));
        app.world_mut().write_message(HostCommand::ShowToggle(false));
        app.update();

        let page = app.world().resource::<PageState>();
        assert_eq!(page.tab, TabId::new("main"));
        assert!(!page.toggle_visible);
    }

    #[test]
    fn labels_follow_page_state() {
        let mut app = App::new();
        let mut page = PageState::new(TabId::new("main"));
        page.type_text("co");
        app.insert_resource(page).add_systems(Update, draw_labels);
        let search = app
            .world_mut()
            .spawn((PageLabel::Search, Text::new(""), Visibility::Inherited))
            .id();
        let toggle = app
            .world_mut()
            .spawn((PageLabel::Toggle, Text::new(""), Visibility::Inherited))
            .id();
        app.update();

        assert_eq!(
            app.world().get::<Text>(search).map(|text| text.0.as_str()),
            Some("Search: co")
        );
        assert_eq!(
            app.world().get::<Visibility>(toggle),
            Some(&Visibility::Hidden)
        );
    }

    #[test]
    fn every_animation_has_a_visible_colour() {
        for animation in Animation::ALL {
            assert!(animation_color(Some(animation)).alpha() > 0.0);
        }
        assert_eq!(animation_color(None).alpha(), 0.0);
    }
}
